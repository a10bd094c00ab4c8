use crate::domain::model::{EncodedEnum, FacilityMatchResponse, MatchResult, MatchedFacility};

/// 將配對 API 的原始回應轉成結果畫面使用的格式。
///
/// 列舉值不論以數字或字串編碼，都會轉成標準字串；無法辨識的值原樣保留。
pub fn adapt(response: Option<&FacilityMatchResponse>) -> Option<MatchResult> {
    let response = response?;

    let facility = response.facility.as_ref().map(|facility| MatchedFacility {
        id: facility.id.clone(),
        name: facility.name.clone(),
        capacity: capacity_string(&facility.capacity),
        zip_code: facility.zip_code.clone(),
        care_types: facility
            .care_types
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(care_type_string)
            .collect(),
        zip_code_ranges: facility.zip_code_ranges.clone().unwrap_or_default(),
    });

    Some(MatchResult {
        matched: response.matched,
        facility,
    })
}

fn care_type_string(value: &EncodedEnum) -> String {
    value
        .care_type()
        .map(|ct| ct.as_str().to_string())
        .unwrap_or_else(|_| value.to_string())
}

fn capacity_string(value: &EncodedEnum) -> String {
    value
        .capacity()
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|_| value.to_string())
}
