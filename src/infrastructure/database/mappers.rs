use super::rows::{
    PhotoCandidateRow, ProjectRow, QueuedOperationRow, SamplePlotRow, TreeMeasurementRow,
    TreePhotoRow,
};
use crate::application::ports::entity_store::PhotoUploadCandidate;
use crate::domain::entities::{
    FieldProject, QueuedOperation, SamplePlot, TreeMeasurement, TreePhoto,
};
use crate::domain::value_objects::{EntityKind, Operation, OperationPayload};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use std::convert::TryInto;

pub fn datetime_to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

fn parse_date(value: Option<String>, label: &str) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|raw| {
            raw.parse::<NaiveDate>()
                .map_err(|e| AppError::DeserializationError(format!("{label}: {e}")))
        })
        .transpose()
}

fn row_u32(value: i64, label: &str) -> Result<u32, AppError> {
    value
        .try_into()
        .map_err(|_| AppError::ValidationError(format!("{label} cannot be negative")))
}

pub fn project_from_row(row: ProjectRow) -> Result<FieldProject, AppError> {
    Ok(FieldProject {
        id: row.id,
        remote_id: row.remote_id,
        name: row.name,
        description: row.description,
        status: row.status.as_str().into(),
        start_date: parse_date(row.start_date, "start_date")?,
        end_date: parse_date(row.end_date, "end_date")?,
        sync_status: row.sync_status.as_str().into(),
        last_synced_at: row.last_synced_at.map(millis_to_datetime),
        created_at: millis_to_datetime(row.created_at),
        updated_at: millis_to_datetime(row.updated_at),
    })
}

pub fn plot_from_row(row: SamplePlotRow) -> Result<SamplePlot, AppError> {
    Ok(SamplePlot {
        id: row.id,
        remote_id: row.remote_id,
        project_id: row.project_id,
        plot_number: row_u32(row.plot_number, "plot_number")?,
        center_lat: row.center_lat,
        center_lon: row.center_lon,
        radius_m: row.radius_m,
        shape: row.shape.as_str().into(),
        status: row.status.as_str().into(),
        sync_status: row.sync_status.as_str().into(),
        last_synced_at: row.last_synced_at.map(millis_to_datetime),
        created_at: millis_to_datetime(row.created_at),
        updated_at: millis_to_datetime(row.updated_at),
    })
}

pub fn tree_from_row(row: TreeMeasurementRow) -> Result<TreeMeasurement, AppError> {
    let defects: Vec<String> = serde_json::from_str(&row.defects)
        .map_err(|e| AppError::DeserializationError(format!("defects: {e}")))?;

    Ok(TreeMeasurement {
        id: row.id,
        remote_id: row.remote_id,
        project_id: row.project_id,
        plot_id: row.plot_id,
        tree_number: row_u32(row.tree_number, "tree_number")?,
        lat: row.lat,
        lon: row.lon,
        dbh_cm: row.dbh_cm,
        height_m: row.height_m,
        species_code: row.species_code,
        health_status: row.health_status.as_str().into(),
        defects,
        sync_status: row.sync_status.as_str().into(),
        last_synced_at: row.last_synced_at.map(millis_to_datetime),
        created_at: millis_to_datetime(row.created_at),
        updated_at: millis_to_datetime(row.updated_at),
    })
}

pub fn photo_from_row(row: TreePhotoRow) -> Result<TreePhoto, AppError> {
    Ok(TreePhoto {
        id: row.id,
        tree_id: row.tree_id,
        local_uri: row.local_uri,
        remote_uri: row.remote_uri,
        kind: row.kind.as_str().into(),
        sync_status: row.sync_status.as_str().into(),
        created_at: millis_to_datetime(row.created_at),
        updated_at: millis_to_datetime(row.updated_at),
    })
}

pub fn photo_candidate_from_row(row: PhotoCandidateRow) -> Result<PhotoUploadCandidate, AppError> {
    let tree_remote_id = row.tree_remote_id.clone();
    let photo = photo_from_row(TreePhotoRow {
        id: row.id,
        tree_id: row.tree_id,
        local_uri: row.local_uri,
        remote_uri: row.remote_uri,
        kind: row.kind,
        sync_status: row.sync_status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })?;

    Ok(PhotoUploadCandidate {
        photo,
        tree_remote_id,
    })
}

pub fn queued_operation_from_row(row: QueuedOperationRow) -> Result<QueuedOperation, AppError> {
    let entity_kind = EntityKind::parse(&row.entity_kind).map_err(AppError::ValidationError)?;
    let operation = Operation::parse(&row.operation).map_err(AppError::ValidationError)?;
    let payload_value: serde_json::Value = serde_json::from_str(&row.payload)
        .map_err(|e| AppError::DeserializationError(format!("payload: {e}")))?;
    let payload = OperationPayload::new(payload_value).map_err(AppError::ValidationError)?;

    Ok(QueuedOperation {
        id: row.id,
        entity_kind,
        entity_id: row.entity_id,
        operation,
        payload,
        attempts: row_u32(row.attempts, "attempts")?,
        max_attempts: row_u32(row.max_attempts, "max_attempts")?,
        last_attempt_at: row.last_attempt_at.map(millis_to_datetime),
        error_message: row.error_message,
        created_at: millis_to_datetime(row.created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_trip_preserves_instant() {
        let now = Utc::now();
        let restored = millis_to_datetime(datetime_to_millis(now));
        assert_eq!(restored.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn queued_operation_row_parses_kind_and_operation() {
        let row = QueuedOperationRow {
            id: 7,
            entity_kind: "tree".into(),
            entity_id: "t1".into(),
            operation: "create".into(),
            payload: r#"{"id":"t1"}"#.into(),
            attempts: 2,
            max_attempts: 5,
            last_attempt_at: None,
            error_message: Some("timeout".into()),
            created_at: 1_700_000_000_000,
        };

        let op = queued_operation_from_row(row).unwrap();
        assert_eq!(op.entity_kind, EntityKind::Tree);
        assert_eq!(op.operation, Operation::Create);
        assert_eq!(op.attempts, 2);
        assert!(!op.is_dead_lettered());
    }

    #[test]
    fn queued_operation_row_rejects_unknown_kind() {
        let row = QueuedOperationRow {
            id: 1,
            entity_kind: "stand".into(),
            entity_id: "x".into(),
            operation: "create".into(),
            payload: "{}".into(),
            attempts: 0,
            max_attempts: 5,
            last_attempt_at: None,
            error_message: None,
            created_at: 0,
        };

        assert!(queued_operation_from_row(row).is_err());
    }
}
