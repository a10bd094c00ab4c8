use crate::domain::model::{
    Facility, FacilityCreate, FacilityMatchResponse, FacilityQuery, FacilityUpdate, MatchRequest,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_prefix(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn extra_headers(&self) -> &BTreeMap<String, String>;
}

/// 遠端配對服務
#[async_trait]
pub trait MatchService: Send + Sync {
    async fn match_facility(&self, request: &MatchRequest) -> Result<FacilityMatchResponse>;
}

/// 機構管理 CRUD
#[async_trait]
pub trait FacilityStore: Send + Sync {
    async fn create_facility(&self, facility: &FacilityCreate) -> Result<Facility>;
    async fn list_facilities(&self, query: &FacilityQuery) -> Result<Vec<Facility>>;
    async fn get_facility(&self, id: &str) -> Result<Facility>;
    async fn update_facility(&self, id: &str, update: &FacilityUpdate) -> Result<Facility>;
    async fn delete_facility(&self, id: &str) -> Result<bool>;
}
