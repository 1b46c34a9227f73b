use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct QueuedRequestRow {
    pub id: i64,
    pub url: String,
    pub method: String,
    pub body: Option<String>,
    pub headers: String,
    pub created_at: String,
    pub local_id: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LocalStateRow {
    pub value: String,
}
