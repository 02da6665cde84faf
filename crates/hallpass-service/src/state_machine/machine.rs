//! Pass state machine operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use hallpass_core::error::AppError;
use hallpass_core::result::AppResult;
use hallpass_core::types::{LocationId, PassId, UserId};
use hallpass_database::repositories::LocationRepository;
use hallpass_entity::location::LocationInfo;
use hallpass_entity::pass::{ClaimInfo, LegState, Pass, PassAction};
use hallpass_entity::student::Student;

use super::action_state::ActionState;
use super::transition::{self, TransitionError};

/// Models one pass's legs and their legal transitions.
///
/// Leg numbers run `1..=n` without gaps, travel legs always move the
/// student somewhere else, and the status flips to closed at most once.
#[derive(Debug, Clone)]
pub struct PassStateMachine {
    locations: Arc<dyn LocationRepository>,
}

impl PassStateMachine {
    /// Create a state machine resolving location types through `locations`.
    pub fn new(locations: Arc<dyn LocationRepository>) -> Self {
        Self { locations }
    }

    /// Resolve a location or fail with `NotFound`.
    pub async fn location(&self, id: LocationId) -> AppResult<LocationInfo> {
        self.locations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Location {id} not found")))
    }

    /// Build a new open pass with its first leg out of the assigned location.
    pub fn create(
        &self,
        id: PassId,
        student: &Student,
        destination: LocationId,
        at: DateTime<Utc>,
    ) -> AppResult<Pass> {
        if destination == student.assigned_location_id {
            return Err(AppError::validation(
                "Destination must differ from the student's current location",
            ));
        }
        Ok(Pass::open(
            id,
            student.id,
            student.assigned_location_id,
            destination,
            at,
        ))
    }

    /// Parse `action` and check it against the pass's current state.
    ///
    /// Unknown names fail with `Validation`; known actions the pass cannot
    /// take right now fail with `InvalidTransition`.
    pub async fn validate_transition(&self, pass: &Pass, action: &str) -> AppResult<PassAction> {
        let action = transition::parse_action(action)?;
        let destination = self.current_destination(pass).await?;
        transition::check(pass, action, &destination)?;
        Ok(action)
    }

    /// Confirm arrival at a non-restroom destination.
    pub async fn arrive(&self, pass: &mut Pass, at: DateTime<Utc>) -> AppResult<()> {
        let destination = self.current_destination(pass).await?;
        transition::check(pass, PassAction::Arrive, &destination)?;
        pass.push_leg(destination.id, destination.id, LegState::In, at);
        self.log_leg(pass, PassAction::Arrive);
        Ok(())
    }

    /// Head back from a confirmed destination to the assigned location.
    pub async fn return_to_class(
        &self,
        pass: &mut Pass,
        student: &Student,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let destination = self.current_destination(pass).await?;
        transition::check(pass, PassAction::ReturnToClass, &destination)?;
        if destination.id == student.assigned_location_id {
            return Err(TransitionError::invalid(
                PassAction::ReturnToClass,
                "student is already at their assigned location",
            )
            .into());
        }
        pass.push_leg(
            destination.id,
            student.assigned_location_id,
            LegState::Out,
            at,
        );
        self.log_leg(pass, PassAction::ReturnToClass);
        Ok(())
    }

    /// Come back from a restroom trip.
    ///
    /// A trip that started at the assigned location closes the pass with a
    /// final leg back there. Otherwise the student is returned to wherever
    /// the trip started and the pass stays open.
    pub async fn restroom_return(
        &self,
        pass: &mut Pass,
        student: &Student,
        closed_by: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let destination = self.current_destination(pass).await?;
        transition::check(pass, PassAction::RestroomReturn, &destination)?;
        let origin = current_origin(pass)?;

        pass.push_leg(destination.id, origin, LegState::In, at);
        if origin == student.assigned_location_id {
            pass.mark_closed(closed_by, at);
            debug!(pass_id = %pass.id, "Restroom trip completed, pass closed");
        }
        self.log_leg(pass, PassAction::RestroomReturn);
        Ok(())
    }

    /// Travel from the current destination to a new one.
    pub async fn add_destination(
        &self,
        pass: &mut Pass,
        destination: LocationId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let current = self.current_destination(pass).await?;
        transition::check(pass, PassAction::NewDestination, &current)?;
        if destination == current.id {
            return Err(TransitionError::invalid(
                PassAction::NewDestination,
                "student is already at that location",
            )
            .into());
        }
        self.location(destination).await?;
        pass.push_leg(current.id, destination, LegState::Out, at);
        self.log_leg(pass, PassAction::NewDestination);
        Ok(())
    }

    /// Close the pass administratively. No leg is added.
    pub fn close(&self, pass: &mut Pass, closed_by: &str, at: DateTime<Utc>) -> AppResult<()> {
        if !pass.is_open() {
            return Err(TransitionError::invalid(PassAction::ClosePass, "pass is already closed").into());
        }
        pass.mark_closed(closed_by, at);
        debug!(pass_id = %pass.id, closed_by, "Pass closed");
        Ok(())
    }

    /// Record a staff claim on an open pass.
    ///
    /// Returns `true` if the claim was recorded, `false` if this user
    /// already held it. A claim held by someone else is a conflict.
    pub fn claim(
        &self,
        pass: &mut Pass,
        user_id: UserId,
        user_name: &str,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        if !pass.is_open() {
            return Err(AppError::invalid_transition("Cannot claim a closed pass"));
        }
        match &pass.claimed_by {
            Some(claim) if claim.user_id == user_id => Ok(false),
            Some(claim) => Err(AppError::conflict(format!(
                "Pass already claimed by {}",
                claim.user_name
            ))),
            None => {
                pass.claimed_by = Some(ClaimInfo {
                    user_id,
                    user_name: user_name.to_string(),
                    timestamp: at,
                });
                pass.last_updated_at = at;
                Ok(true)
            }
        }
    }

    /// Describe the current leg and what can happen next. Never mutates.
    pub async fn determine_action_state(
        &self,
        pass: &Pass,
        student: &Student,
    ) -> AppResult<ActionState> {
        let leg = pass
            .current_leg()
            .ok_or_else(|| AppError::internal(format!("Pass {} has no legs", pass.id)))?;
        let destination = self.current_destination(pass).await?;
        let is_restroom_trip = destination.is_bathroom();

        let return_to = if is_restroom_trip {
            leg.origin_location_id
        } else {
            student.assigned_location_id
        };
        let return_location_name = self.location(return_to).await?.name;

        let available_actions: Vec<PassAction> = PassAction::TRANSITIONS
            .into_iter()
            .filter(|action| transition::check(pass, *action, &destination).is_ok())
            .filter(|action| {
                *action != PassAction::ReturnToClass
                    || destination.id != student.assigned_location_id
            })
            .collect();

        Ok(ActionState {
            is_restroom_trip,
            current_location_id: destination.id,
            leg_state: leg.state,
            return_location_name,
            can_arrive: available_actions.contains(&PassAction::Arrive),
            available_actions,
        })
    }

    async fn current_destination(&self, pass: &Pass) -> AppResult<LocationInfo> {
        let leg = pass
            .current_leg()
            .ok_or_else(|| AppError::internal(format!("Pass {} has no legs", pass.id)))?;
        self.location(leg.destination_location_id).await
    }

    fn log_leg(&self, pass: &Pass, action: PassAction) {
        if let Some(leg) = pass.current_leg() {
            debug!(
                pass_id = %pass.id,
                action = %action,
                leg_number = leg.leg_number,
                state = %leg.state,
                "Leg appended"
            );
        }
    }
}

fn current_origin(pass: &Pass) -> AppResult<LocationId> {
    pass.current_leg()
        .map(|leg| leg.origin_location_id)
        .ok_or_else(|| AppError::internal(format!("Pass {} has no legs", pass.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hallpass_core::error::ErrorKind;
    use hallpass_core::types::StudentId;
    use hallpass_database::memory::MemoryLocationRepository;
    use hallpass_entity::location::LocationType;
    use hallpass_entity::pass::PassStatus;

    struct World {
        machine: PassStateMachine,
        student: Student,
        classroom: LocationId,
        bathroom: LocationId,
        library: LocationId,
        office: LocationId,
    }

    fn world() -> World {
        let repo = MemoryLocationRepository::new();
        let classroom = LocationId::new();
        let bathroom = LocationId::new();
        let library = LocationId::new();
        let office = LocationId::new();
        repo.insert(LocationInfo::new(classroom, "Room 204", LocationType::Classroom));
        repo.insert(LocationInfo::new(bathroom, "North restroom", LocationType::Bathroom));
        repo.insert(LocationInfo::new(library, "Library", LocationType::Library));
        repo.insert(LocationInfo::new(office, "Front office", LocationType::Office));
        World {
            machine: PassStateMachine::new(Arc::new(repo)),
            student: Student::new(StudentId::new(), "Jordan", classroom),
            classroom,
            bathroom,
            library,
            office,
        }
    }

    fn travel_legs_move(pass: &Pass) -> bool {
        pass.legs
            .iter()
            .filter(|l| l.state == LegState::Out)
            .all(|l| l.is_travel())
    }

    #[test]
    fn test_create_rejects_same_location() {
        let w = world();
        let err = w
            .machine
            .create(PassId::new(), &w.student, w.classroom, Utc::now())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_supervised_round_trip() {
        let w = world();
        let t = Utc::now();
        let mut pass = w.machine.create(PassId::new(), &w.student, w.library, t).unwrap();

        w.machine.arrive(&mut pass, t + Duration::minutes(2)).await.unwrap();
        assert_eq!(pass.legs[1].origin_location_id, w.library);
        assert_eq!(pass.legs[1].destination_location_id, w.library);
        assert_eq!(pass.legs[1].state, LegState::In);

        w.machine
            .return_to_class(&mut pass, &w.student, t + Duration::minutes(20))
            .await
            .unwrap();
        let last = pass.current_leg().unwrap();
        assert_eq!(last.origin_location_id, w.library);
        assert_eq!(last.destination_location_id, w.classroom);
        assert_eq!(last.state, LegState::Out);
        assert!(pass.legs_are_contiguous());
        assert!(travel_legs_move(&pass));
        assert_eq!(pass.last_updated_at, t + Duration::minutes(20));
    }

    #[tokio::test]
    async fn test_restroom_from_assigned_location_closes() {
        let w = world();
        let t = Utc::now();
        let mut pass = w.machine.create(PassId::new(), &w.student, w.bathroom, t).unwrap();

        w.machine
            .restroom_return(&mut pass, &w.student, "Ms. Rivera", t + Duration::minutes(4))
            .await
            .unwrap();

        assert_eq!(pass.status, PassStatus::Closed);
        assert_eq!(pass.closed_by.as_deref(), Some("Ms. Rivera"));
        assert!(pass.closed_at.is_some());
        let last = pass.current_leg().unwrap();
        assert_eq!(last.state, LegState::In);
        assert_eq!(last.destination_location_id, w.classroom);
        assert_eq!(last.leg_number, 2);
    }

    #[tokio::test]
    async fn test_restroom_from_elsewhere_returns_to_prior_origin() {
        let w = world();
        let t = Utc::now();
        let mut pass = w.machine.create(PassId::new(), &w.student, w.library, t).unwrap();
        w.machine.arrive(&mut pass, t).await.unwrap();
        w.machine.add_destination(&mut pass, w.bathroom, t).await.unwrap();

        w.machine
            .restroom_return(&mut pass, &w.student, "Librarian", t)
            .await
            .unwrap();

        assert!(pass.is_open());
        let last = pass.current_leg().unwrap();
        assert_eq!(last.origin_location_id, w.bathroom);
        assert_eq!(last.destination_location_id, w.library);
        assert_eq!(last.state, LegState::In);
        assert!(pass.legs_are_contiguous());
    }

    #[tokio::test]
    async fn test_arrive_at_bathroom_is_invalid() {
        let w = world();
        let mut pass = w
            .machine
            .create(PassId::new(), &w.student, w.bathroom, Utc::now())
            .unwrap();
        let err = w.machine.arrive(&mut pass, Utc::now()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
        assert_eq!(pass.legs.len(), 1);
    }

    #[tokio::test]
    async fn test_validate_transition_distinguishes_errors() {
        let w = world();
        let pass = w
            .machine
            .create(PassId::new(), &w.student, w.library, Utc::now())
            .unwrap();

        let unknown = w.machine.validate_transition(&pass, "teleport").await.unwrap_err();
        assert_eq!(unknown.kind, ErrorKind::Validation);
        let invalid = w
            .machine
            .validate_transition(&pass, "return_to_class")
            .await
            .unwrap_err();
        assert_eq!(invalid.kind, ErrorKind::InvalidTransition);
        assert_eq!(
            w.machine.validate_transition(&pass, "arrive").await.unwrap(),
            PassAction::Arrive
        );
    }

    #[tokio::test]
    async fn test_add_destination_rejects_current_and_unknown() {
        let w = world();
        let t = Utc::now();
        let mut pass = w.machine.create(PassId::new(), &w.student, w.library, t).unwrap();

        let same = w.machine.add_destination(&mut pass, w.library, t).await.unwrap_err();
        assert_eq!(same.kind, ErrorKind::InvalidTransition);
        let missing = w
            .machine
            .add_destination(&mut pass, LocationId::new(), t)
            .await
            .unwrap_err();
        assert_eq!(missing.kind, ErrorKind::NotFound);

        w.machine.add_destination(&mut pass, w.office, t).await.unwrap();
        assert_eq!(pass.legs.len(), 2);
        assert_eq!(pass.legs[1].origin_location_id, w.library);
    }

    #[tokio::test]
    async fn test_return_rejected_when_already_home() {
        let w = world();
        let t = Utc::now();
        let mut pass = w.machine.create(PassId::new(), &w.student, w.library, t).unwrap();
        w.machine.arrive(&mut pass, t).await.unwrap();
        w.machine.return_to_class(&mut pass, &w.student, t).await.unwrap();
        w.machine.arrive(&mut pass, t).await.unwrap();

        let err = w
            .machine
            .return_to_class(&mut pass, &w.student, t)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_close_once_then_invalid() {
        let w = world();
        let mut pass = w
            .machine
            .create(PassId::new(), &w.student, w.library, Utc::now())
            .unwrap();
        w.machine.close(&mut pass, "Admin", Utc::now()).unwrap();
        assert_eq!(pass.legs.len(), 1);
        let err = w.machine.close(&mut pass, "Admin", Utc::now()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_claim_rules() {
        let w = world();
        let mut pass = w
            .machine
            .create(PassId::new(), &w.student, w.library, Utc::now())
            .unwrap();
        let first = UserId::new();

        assert!(w.machine.claim(&mut pass, first, "Mr. Chen", Utc::now()).unwrap());
        assert!(!w.machine.claim(&mut pass, first, "Mr. Chen", Utc::now()).unwrap());
        let err = w
            .machine
            .claim(&mut pass, UserId::new(), "Ms. Park", Utc::now())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_action_state_for_restroom_and_supervised_trips() {
        let w = world();
        let t = Utc::now();

        let restroom = w.machine.create(PassId::new(), &w.student, w.bathroom, t).unwrap();
        let state = w.machine.determine_action_state(&restroom, &w.student).await.unwrap();
        assert!(state.is_restroom_trip);
        assert!(!state.can_arrive);
        assert_eq!(state.return_location_name, "Room 204");
        assert!(state.available_actions.contains(&PassAction::RestroomReturn));

        let mut library = w.machine.create(PassId::new(), &w.student, w.library, t).unwrap();
        let state = w.machine.determine_action_state(&library, &w.student).await.unwrap();
        assert!(!state.is_restroom_trip);
        assert!(state.can_arrive);

        w.machine.arrive(&mut library, t).await.unwrap();
        let before = library.clone();
        let state = w.machine.determine_action_state(&library, &w.student).await.unwrap();
        assert!(!state.can_arrive);
        assert!(state.available_actions.contains(&PassAction::ReturnToClass));
        assert_eq!(library, before);
    }
}
