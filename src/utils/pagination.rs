use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, Select,
};
use serde::Serialize;

/// One window over an ordered query. Page numbers are 1-based; a page past
/// the end carries an empty item list with `has_next == false`.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

pub fn num_pages(total: u64, per_page: u64) -> u64 {
    total.div_ceil(per_page.max(1))
}

pub async fn paginate<C, E>(
    db: &C,
    select: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<Page<E::Model>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync,
{
    if page == 0 {
        return Err(DbErr::Custom("page numbers are 1-based".to_string()));
    }

    let paginator = select.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;
    let pages = num_pages(total, per_page);

    Ok(Page {
        items,
        page,
        total,
        has_next: page < pages,
        has_previous: page > 1,
    })
}
