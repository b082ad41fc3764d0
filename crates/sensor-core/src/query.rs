//! # Query Resolver
//!
//! Maps a validated [`Query`] to the [`Response`] sent back to the peer.

use crate::aggregate::mean_of_history;
use crate::store::SensorStore;
use crate::wire::{DataType, Payload, Query, QueryKind, Response};

/// Answer a query from the current state.
///
/// A sensor without readings yields the `EMCY` marker for every query kind.
pub fn resolve(store: &SensorStore, query: &Query) -> Response {
    let state = store.get(query.sensor);
    let Some(last_value) = state.last_value() else {
        return Response::no_data(query.sensor);
    };

    let (data_type, value) = match query.kind {
        QueryKind::LastValue => (state.last_type(), last_value),
        QueryKind::MeanLastK => (DataType::Double, Payload::from_f64(mean_of_history(state))),
        QueryKind::MeanAll => (
            DataType::Double,
            Payload::from_f64(state.running_mean().unwrap_or_default()),
        ),
    };

    Response {
        sensor: query.sensor,
        data_type,
        value,
    }
}
