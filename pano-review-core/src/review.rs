//! Review submission and derived status.
//!
//! The history is the source of truth: status is always the result of one
//! fold over the time-ordered review rows, never a "does any confirm row
//! exist" shortcut — a detection confirmed and later rejected is Rejected.

use tracing::info;

use crate::error::{CoreError, ValidationError};
use crate::model::{Review, ReviewAction, ReviewStatus, ReviewedDetection};
use crate::store::Store;

/// A reviewer's verdict as received from the outside, action still unparsed.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub detection_id: i64,
    pub action: String,
    pub reviewer: String,
    pub new_class: Option<String>,
    pub note: Option<String>,
}

/// Fold a time-ordered history into the detection's current status. The last
/// row wins; an empty history is Pending.
pub fn derive_status(history: &[Review]) -> ReviewStatus {
    history.iter().fold(ReviewStatus::Pending, |_, review| match review.action {
        ReviewAction::Confirm => ReviewStatus::Confirmed,
        ReviewAction::Reject => ReviewStatus::Rejected,
    })
}

/// Append one review row. All validation runs before the write; existing
/// rows are never touched.
pub fn submit_review(store: &Store, request: &ReviewRequest) -> Result<Review, CoreError> {
    let action = ReviewAction::parse(&request.action)
        .ok_or_else(|| ValidationError::InvalidAction(request.action.clone()))?;
    if store.get_detection(request.detection_id)?.is_none() {
        return Err(CoreError::DetectionNotFound(request.detection_id));
    }
    let review = store.append_review(
        request.detection_id,
        action,
        &request.reviewer,
        request.new_class.as_deref(),
        request.note.as_deref(),
    )?;
    info!(
        detection_id = request.detection_id,
        action = %action,
        reviewer = %request.reviewer,
        "review appended"
    );
    Ok(review)
}

/// Current status of one detection.
pub fn current_status(store: &Store, detection_id: i64) -> Result<ReviewStatus, CoreError> {
    if store.get_detection(detection_id)?.is_none() {
        return Err(CoreError::DetectionNotFound(detection_id));
    }
    Ok(derive_status(&store.review_history(detection_id)?))
}

/// A panorama's detections joined with their derived review state.
pub fn list_with_status(store: &Store, pano_id: i64) -> Result<Vec<ReviewedDetection>, CoreError> {
    let detections = store.list_detections(pano_id)?;
    let mut reviewed = Vec::with_capacity(detections.len());
    for detection in detections {
        let history = store.review_history(detection.id)?;
        let status = derive_status(&history);
        let latest = history.last();
        reviewed.push(ReviewedDetection {
            status,
            review_action: latest.map(|r| r.action),
            reviewed_at: latest.map(|r| r.created_at),
            new_class: latest.and_then(|r| r.new_class.clone()),
            detection,
        });
    }
    Ok(reviewed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{door_detection, seeded_pano};
    use crate::model::Face;

    fn confirm(detection_id: i64) -> ReviewRequest {
        ReviewRequest {
            detection_id,
            action: "confirm".into(),
            reviewer: "alex".into(),
            new_class: None,
            note: None,
        }
    }

    fn reject(detection_id: i64) -> ReviewRequest {
        ReviewRequest {
            detection_id,
            action: "reject".into(),
            reviewer: "alex".into(),
            new_class: None,
            note: Some("glare artifact".into()),
        }
    }

    #[test]
    fn status_starts_pending() {
        let (store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        assert_eq!(current_status(&store, det).unwrap(), ReviewStatus::Pending);
    }

    #[test]
    fn submit_is_strictly_additive() {
        let (store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        for expected_len in 1..=4 {
            submit_review(&store, &confirm(det)).unwrap();
            assert_eq!(store.review_history(det).unwrap().len(), expected_len);
        }
    }

    #[test]
    fn latest_review_wins() {
        let (store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();

        submit_review(&store, &confirm(det)).unwrap();
        assert_eq!(current_status(&store, det).unwrap(), ReviewStatus::Confirmed);

        submit_review(&store, &reject(det)).unwrap();
        assert_eq!(current_status(&store, det).unwrap(), ReviewStatus::Rejected);

        submit_review(&store, &confirm(det)).unwrap();
        assert_eq!(current_status(&store, det).unwrap(), ReviewStatus::Confirmed);
    }

    #[test]
    fn unknown_detection_is_not_found() {
        let (store, _pano_id) = seeded_pano();
        assert!(matches!(
            submit_review(&store, &confirm(999)).unwrap_err(),
            CoreError::DetectionNotFound(999)
        ));
        assert!(matches!(
            current_status(&store, 999).unwrap_err(),
            CoreError::DetectionNotFound(999)
        ));
    }

    #[test]
    fn invalid_action_is_rejected_before_any_write() {
        let (store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        let bad = ReviewRequest {
            detection_id: det,
            action: "approve".into(),
            reviewer: "alex".into(),
            new_class: None,
            note: None,
        };
        assert!(matches!(
            submit_review(&store, &bad).unwrap_err(),
            CoreError::Validation(ValidationError::InvalidAction(_))
        ));
        assert!(store.review_history(det).unwrap().is_empty());
    }

    #[test]
    fn listing_carries_latest_action_and_new_class() {
        let (store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        let mut request = confirm(det);
        request.new_class = Some("IfcWindow".into());
        submit_review(&store, &request).unwrap();

        let listed = list_with_status(&store, pano_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, ReviewStatus::Confirmed);
        assert_eq!(listed[0].review_action, Some(ReviewAction::Confirm));
        assert_eq!(listed[0].new_class.as_deref(), Some("IfcWindow"));
        assert!(listed[0].reviewed_at.is_some());
    }
}
