use chrono::NaiveDate;

/// Instruction sent to the completion backend for one query
pub fn build_prompt(query: &str, today: NaiveDate) -> String {
    format!(
        r#"You turn requests for satellite and geospatial data into search parameters.

Today is {today}.
Query: "{query}"

Answer with one JSON object holding these keys, null when the query does not say:
{{
    "product": "canonical product code, e.g. S2_MSI_L2A, LANDSAT_C2L2, COP-DEM_GLO-30",
    "data_type": "optical | sar | dem | land_cover | climate | population | air_quality",
    "location": "place name as written in the query",
    "bbox": [west, south, east, north],
    "start_date": "YYYY-MM-DD",
    "end_date": "YYYY-MM-DD",
    "cloud_cover_max": "number between 0 and 100",
    "provider": "provider name if one is requested"
}}

Product codes:
- Sentinel-2, S2: S2_MSI_L2A (optical)
- Sentinel-1, S1, SAR: S1_SAR_GRD (sar)
- Landsat 8, Landsat 9, L8, L9, Landsat: LANDSAT_C2L2 (optical)
- DEM, elevation, SRTM, height: COP-DEM_GLO-30 (dem)
- land cover, LULC: ESA_WORLDCOVER (land_cover)
- MODIS: MODIS_MOD09GA (optical)

Dates are inclusive:
- "last week": the 7 days up to today
- "last month": the 30 days up to today
- "last N days": the N days up to today
- "yesterday": yesterday for both dates
- "January 2024": 2024-01-01 to 2024-01-31
- "2024": 2024-01-01 to 2024-12-31

Cloud cover:
- "less than 20% clouds": 20
- "clear skies": 10
- "mostly clear": 20

Reply with the JSON object only."#,
        today = today.format("%Y-%m-%d"),
        query = query.replace('"', "'"),
    )
}
