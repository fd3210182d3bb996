use crate::domain::{models::setting::Setting, ports::SettingRepository};
use crate::error::AppError;
use crate::infra::db::Gateway;
use crate::params;
use async_trait::async_trait;

pub struct SqlSettingRepo {
    gateway: Gateway,
}

impl SqlSettingRepo {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl SettingRepository for SqlSettingRepo {
    async fn set_many(&self, values: &[(&str, &str)]) -> Result<(), AppError> {
        let mut tx = self.gateway.begin().await?;
        for (key, value) in values {
            tx.execute(
                "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT (key) DO UPDATE SET value = excluded.value",
                &params![*key, *value],
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Setting>, AppError> {
        Ok(self.gateway.query("SELECT key, value FROM settings ORDER BY key", &[]).await?)
    }
}
