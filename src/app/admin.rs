use crate::core::schema::{self, FacilityForm};
use crate::domain::model::{Facility, FacilityQuery, FacilityUpdate};
use crate::domain::ports::FacilityStore;
use crate::utils::error::Result;

/// 機構管理：送出前先在本地驗證表單
pub struct FacilityAdmin<S: FacilityStore> {
    store: S,
}

impl<S: FacilityStore> FacilityAdmin<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 新增成功時回傳機構與提示訊息
    pub async fn create(&self, form: &FacilityForm) -> Result<(Facility, String)> {
        let payload = form.validate()?;
        tracing::info!("📝 Creating facility \"{}\"", payload.name);

        let facility = self.store.create_facility(&payload).await?;
        let message = format!("Facility \"{}\" added successfully!", facility.name);
        tracing::info!("✅ {} (id: {})", message, facility.id);
        Ok((facility, message))
    }

    pub async fn list(&self, query: &FacilityQuery) -> Result<Vec<Facility>> {
        let facilities = self.store.list_facilities(query).await?;
        tracing::info!("📋 Retrieved {} facilities", facilities.len());
        Ok(facilities)
    }

    pub async fn get(&self, id: &str) -> Result<Facility> {
        self.store.get_facility(id).await
    }

    pub async fn update(&self, id: &str, update: &FacilityUpdate) -> Result<Facility> {
        schema::validate_facility_update(update)?;
        let facility = self.store.update_facility(id, update).await?;
        tracing::info!("✅ Facility \"{}\" updated", facility.name);
        Ok(facility)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete_facility(id).await?;
        if deleted {
            tracing::info!("🗑️ Facility {} deleted", id);
        } else {
            tracing::warn!("Facility {} was not deleted", id);
        }
        Ok(deleted)
    }
}
