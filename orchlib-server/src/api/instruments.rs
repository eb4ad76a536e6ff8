//! Instrument catalog for the bulk score picker

use axum::Json;
use orchlib_common::instruments::{InstrumentGroup, ORCHESTRA_INSTRUMENTS};

/// GET /api/instruments
pub async fn list_instruments() -> Json<&'static [InstrumentGroup]> {
    Json(ORCHESTRA_INSTRUMENTS)
}
