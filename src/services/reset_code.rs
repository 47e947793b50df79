use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::{password_reset_codes, prelude::*};

/// Returns a uniformly random confirmation code with exactly
/// `digit_length` digits (no leading zero), drawn from the OS RNG.
pub fn generate_code(digit_length: u32) -> i64 {
    let low = 10_i64.pow(digit_length - 1);
    let high = 10_i64.pow(digit_length) - 1;
    OsRng.gen_range(low..=high)
}

/// Absolute expiry instant in epoch seconds.
pub fn compute_expiry(now: DateTime<Utc>, lifetime_seconds: i64) -> i64 {
    now.timestamp() + lifetime_seconds
}

/// Creates and persists a fresh code for the user. Outstanding codes for
/// the same user are removed first: at most one code is active at a time.
pub async fn issue<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    config: &AppConfig,
) -> Result<password_reset_codes::Model, DbErr> {
    PasswordResetCodes::delete_many()
        .filter(password_reset_codes::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    let now = Utc::now();
    let code = password_reset_codes::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        code: Set(generate_code(config.reset_code_length)),
        expires_at: Set(compute_expiry(now, config.reset_code_lifetime_secs)),
        created_at: Set(now),
    };

    code.insert(db).await
}

/// True iff a stored code for the user matches `submitted_code` and `now`
/// is strictly before its expiry. A matching live code is consumed: it is
/// deleted and cannot be replayed. The caller gets a single boolean, so a
/// wrong code and an expired one are indistinguishable downstream.
pub async fn validate_and_consume<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    submitted_code: i64,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let stored = PasswordResetCodes::find()
        .filter(password_reset_codes::Column::UserId.eq(user_id))
        .filter(password_reset_codes::Column::Code.eq(submitted_code))
        .one(db)
        .await?;

    let Some(stored) = stored else {
        return Ok(false);
    };

    if now.timestamp() >= stored.expires_at {
        return Ok(false);
    }

    stored.delete(db).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_code_range() {
        for length in [4u32, 6] {
            let low = 10_i64.pow(length - 1);
            let high = 10_i64.pow(length) - 1;
            for _ in 0..1000 {
                let code = generate_code(length);
                assert!((low..=high).contains(&code), "{} out of range", code);
            }
        }
    }

    #[test]
    fn test_compute_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        assert_eq!(compute_expiry(now, 60), now.timestamp() + 60);
        assert_eq!(compute_expiry(now, 0), now.timestamp());
    }
}
