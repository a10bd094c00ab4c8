use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 病患需要的照護類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareType {
    Stationary,
    Ambulatory,
    DayCare,
}

impl CareType {
    pub const ALL: [CareType; 3] = [CareType::Stationary, CareType::Ambulatory, CareType::DayCare];

    /// 後端列舉的宣告順序：ambulatory, stationary, day_care
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(CareType::Ambulatory),
            1 => Some(CareType::Stationary),
            2 => Some(CareType::DayCare),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CareType::Stationary => "stationary",
            CareType::Ambulatory => "ambulatory",
            CareType::DayCare => "day_care",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CareType::Stationary => "Stationary",
            CareType::Ambulatory => "Ambulatory",
            CareType::DayCare => "Day Care",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CareType::Stationary => "In-patient care at a facility",
            CareType::Ambulatory => "Out-patient visiting care",
            CareType::DayCare => "Temporary supervision and care",
        }
    }

    /// 日間照護不需要郵遞區號
    pub fn requires_zip_code(&self) -> bool {
        !matches!(self, CareType::DayCare)
    }
}

impl fmt::Display for CareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for CareType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 舊資料有 "Ambulatory" 這種大小寫，前端列舉鍵則是 DAY_CARE
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "stationary" => Ok(CareType::Stationary),
            "ambulatory" => Ok(CareType::Ambulatory),
            "daycare" => Ok(CareType::DayCare),
            _ => Err(ParseEnumError {
                kind: "care type",
                value: s.to_string(),
            }),
        }
    }
}

/// 機構容量狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityType {
    Available,
    Full,
}

impl CapacityType {
    /// 後端列舉的宣告順序：full, available
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(CapacityType::Full),
            1 => Some(CapacityType::Available),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityType::Available => "available",
            CapacityType::Full => "full",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapacityType::Available => "Available",
            CapacityType::Full => "Full",
        }
    }
}

impl fmt::Display for CapacityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapacityType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(CapacityType::Available),
            "full" => Ok(CapacityType::Full),
            _ => Err(ParseEnumError {
                kind: "capacity",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipCodeRange {
    pub min_zip_code: u32,
    pub max_zip_code: u32,
}

impl ZipCodeRange {
    pub fn new(min_zip_code: u32, max_zip_code: u32) -> Self {
        Self {
            min_zip_code,
            max_zip_code,
        }
    }
}

impl fmt::Display for ZipCodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05} - {:05}", self.min_zip_code, self.max_zip_code)
    }
}

impl FromStr for ZipCodeRange {
    type Err = ParseEnumError;

    /// 解析 "MIN-MAX" 格式
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseEnumError {
            kind: "zip code range",
            value: s.to_string(),
        };

        let (min, max) = s.split_once('-').ok_or_else(invalid)?;
        let min = min.trim().parse::<u32>().map_err(|_| invalid())?;
        let max = max.trim().parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(min, max))
    }
}

/// 管理端使用的機構資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub zip_code: String,
    #[serde(deserialize_with = "deserialize_capacity")]
    pub capacity: CapacityType,
    #[serde(default, deserialize_with = "deserialize_care_types")]
    pub care_types: Vec<CareType>,
    #[serde(default)]
    pub zip_code_ranges: Vec<ZipCodeRange>,
}

fn deserialize_capacity<'de, D>(deserializer: D) -> Result<CapacityType, D::Error>
where
    D: Deserializer<'de>,
{
    EncodedEnum::deserialize(deserializer)?
        .capacity()
        .map_err(de::Error::custom)
}

/// 無法辨識的照護類型會被略過，不影響整筆資料
fn deserialize_care_types<'de, D>(deserializer: D) -> Result<Vec<CareType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<EncodedEnum>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .iter()
        .filter_map(|value| match value.care_type() {
            Ok(care_type) => Some(care_type),
            Err(e) => {
                tracing::warn!("Skipping facility care type: {}", e);
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityCreate {
    pub name: String,
    pub zip_code: String,
    pub capacity: CapacityType,
    pub care_types: Vec<CareType>,
    pub zip_code_ranges: Vec<ZipCodeRange>,
}

/// 部分更新，未設定的欄位不會送出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_types: Option<Vec<CareType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code_ranges: Option<Vec<ZipCodeRange>>,
}

impl FacilityUpdate {
    pub fn is_empty(&self) -> bool {
        self == &FacilityUpdate::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FacilityQuery {
    pub skip: Option<u32>,
    pub limit: u32,
    pub capacity: Option<CapacityType>,
    pub care_type: Option<CareType>,
    pub zip_code: Option<String>,
}

impl Default for FacilityQuery {
    fn default() -> Self {
        Self {
            skip: None,
            limit: 100,
            capacity: None,
            care_type: None,
            zip_code: None,
        }
    }
}

impl FacilityQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        if let Some(capacity) = self.capacity {
            pairs.push(("capacity", capacity.to_string()));
        }
        if let Some(care_type) = self.care_type {
            pairs.push(("care_type", care_type.to_string()));
        }
        if let Some(zip_code) = &self.zip_code {
            pairs.push(("zip_code", zip_code.clone()));
        }
        pairs
    }
}

/// 經過驗證的病患資料，只能透過 `core::schema` 建立
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientInput {
    pub(crate) name: String,
    pub(crate) care_type: CareType,
    pub(crate) zip_code: Option<String>,
}

impl PatientInput {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn care_type(&self) -> CareType {
        self.care_type
    }

    pub fn zip_code(&self) -> Option<&str> {
        self.zip_code.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub patient_name: String,
    pub care_type: CareType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl From<&PatientInput> for MatchRequest {
    fn from(input: &PatientInput) -> Self {
        Self {
            patient_name: input.name.clone(),
            care_type: input.care_type,
            zip_code: input.zip_code.clone(),
        }
    }
}

/// 列舉值可能以數字或字串編碼
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EncodedEnum {
    Index(u64),
    Name(String),
}

impl EncodedEnum {
    pub fn care_type(&self) -> Result<CareType, ParseEnumError> {
        match self {
            EncodedEnum::Index(index) => CareType::from_index(*index).ok_or_else(|| ParseEnumError {
                kind: "care type",
                value: index.to_string(),
            }),
            EncodedEnum::Name(name) => name.parse(),
        }
    }

    pub fn capacity(&self) -> Result<CapacityType, ParseEnumError> {
        match self {
            EncodedEnum::Index(index) => {
                CapacityType::from_index(*index).ok_or_else(|| ParseEnumError {
                    kind: "capacity",
                    value: index.to_string(),
                })
            }
            EncodedEnum::Name(name) => name.parse(),
        }
    }
}

impl fmt::Display for EncodedEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodedEnum::Index(index) => write!(f, "{}", index),
            EncodedEnum::Name(name) => f.write_str(name),
        }
    }
}

/// 配對 API 的原始回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityMatchResponse {
    pub matched: bool,
    #[serde(default)]
    pub facility: Option<RawFacility>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFacility {
    pub id: String,
    pub name: String,
    pub zip_code: String,
    pub capacity: EncodedEnum,
    #[serde(default)]
    pub care_types: Option<Vec<EncodedEnum>>,
    #[serde(default)]
    pub zip_code_ranges: Option<Vec<ZipCodeRange>>,
}

/// 給結果畫面使用的穩定格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    pub facility: Option<MatchedFacility>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedFacility {
    pub id: String,
    pub name: String,
    pub capacity: String,
    pub zip_code: String,
    pub care_types: Vec<String>,
    pub zip_code_ranges: Vec<ZipCodeRange>,
}

impl MatchedFacility {
    pub fn known_care_types(&self) -> Vec<CareType> {
        self.care_types
            .iter()
            .filter_map(|ct| ct.parse().ok())
            .collect()
    }
}
