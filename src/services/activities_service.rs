use thiserror::Error;
use tracing::info;

use crate::database::activities_repo::ActivityDirectory;
use crate::models::ActivityListing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActivityError {
    #[error("Activity not found")]
    ActivityNotFound,

    #[error("Student already signed up for this activity")]
    DuplicateParticipant,

    #[error("Participant not found in this activity")]
    ParticipantNotFound,

    #[error("Activity is full")]
    ActivityFull,
}

/// Whether `max_participants` limits signups or is only displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    #[default]
    Advisory,
    Enforced,
}

impl CapacityPolicy {
    pub fn from_enforce_flag(enforce: bool) -> Self {
        if enforce {
            Self::Enforced
        } else {
            Self::Advisory
        }
    }
}

pub fn list_activities(directory: &ActivityDirectory) -> ActivityListing {
    directory.snapshot()
}

/// Appends `email` to the roster of `activity_name`.
///
/// Checks run in order: unknown activity, already enrolled, then (only with
/// [`CapacityPolicy::Enforced`]) a full roster. A failed check leaves the
/// roster untouched.
pub fn signup(
    directory: &ActivityDirectory,
    policy: CapacityPolicy,
    activity_name: &str,
    email: &str,
) -> Result<String, ActivityError> {
    directory
        .with_activity_mut(activity_name, |activity| {
            if activity.is_enrolled(email) {
                return Err(ActivityError::DuplicateParticipant);
            }
            if policy == CapacityPolicy::Enforced && activity.is_full() {
                return Err(ActivityError::ActivityFull);
            }
            activity.participants.push(email.to_string());
            Ok(())
        })
        .unwrap_or(Err(ActivityError::ActivityNotFound))?;

    info!(activity = %activity_name, email = %email, "participant signed up");
    Ok(format!("{} signed up for {}", email, activity_name))
}

/// Removes `email` from the roster of `activity_name`, keeping the order of
/// everyone else.
pub fn unregister(
    directory: &ActivityDirectory,
    activity_name: &str,
    email: &str,
) -> Result<String, ActivityError> {
    directory
        .with_activity_mut(activity_name, |activity| {
            let index = activity
                .participants
                .iter()
                .position(|p| p == email)
                .ok_or(ActivityError::ParticipantNotFound)?;
            activity.participants.remove(index);
            Ok(())
        })
        .unwrap_or(Err(ActivityError::ActivityNotFound))?;

    info!(activity = %activity_name, email = %email, "participant removed");
    Ok(format!("{} removed from {}", email, activity_name))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::models::Activity;

    fn roster(directory: &ActivityDirectory, name: &str) -> Vec<String> {
        list_activities(directory)
            .get(name)
            .map(|a| a.participants.clone())
            .unwrap_or_default()
    }

    #[test]
    fn signup_appends_after_existing_participants() {
        let directory = ActivityDirectory::seeded();
        let before = roster(&directory, "Chess Club");

        let message = signup(&directory, CapacityPolicy::Advisory, "Chess Club", "new@x.edu").unwrap();

        assert_eq!(message, "new@x.edu signed up for Chess Club");
        let after = roster(&directory, "Chess Club");
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.last().map(String::as_str), Some("new@x.edu"));
    }

    #[test]
    fn duplicate_signup_is_rejected_and_roster_unchanged() {
        let directory = ActivityDirectory::seeded();
        signup(&directory, CapacityPolicy::Advisory, "Chess Club", "new@x.edu").unwrap();
        let before = roster(&directory, "Chess Club");

        let err = signup(&directory, CapacityPolicy::Advisory, "Chess Club", "new@x.edu").unwrap_err();

        assert_eq!(err, ActivityError::DuplicateParticipant);
        assert_eq!(roster(&directory, "Chess Club"), before);
    }

    #[test]
    fn signup_to_unknown_activity_leaves_directory_unchanged() {
        let directory = ActivityDirectory::seeded();
        let before = list_activities(&directory);

        let err = signup(&directory, CapacityPolicy::Advisory, "Nonexistent", "a@x.edu").unwrap_err();

        assert_eq!(err, ActivityError::ActivityNotFound);
        assert_eq!(list_activities(&directory), before);
    }

    #[test]
    fn activity_names_are_case_and_whitespace_sensitive() {
        let directory = ActivityDirectory::seeded();

        for name in ["chess club", "Chess Club ", "CHESS CLUB"] {
            assert_eq!(
                signup(&directory, CapacityPolicy::Advisory, name, "a@x.edu"),
                Err(ActivityError::ActivityNotFound)
            );
        }
    }

    #[test]
    fn emails_differing_only_in_case_are_distinct() {
        let directory = ActivityDirectory::seeded();

        signup(&directory, CapacityPolicy::Advisory, "Art Workshop", "CaseTest@Mergington.EDU").unwrap();
        signup(&directory, CapacityPolicy::Advisory, "Art Workshop", "casetest@mergington.edu").unwrap();

        let names = roster(&directory, "Art Workshop");
        assert!(names.contains(&"CaseTest@Mergington.EDU".to_string()));
        assert!(names.contains(&"casetest@mergington.edu".to_string()));
    }

    #[test]
    fn unregister_after_signup_then_again_fails() {
        let directory = ActivityDirectory::seeded();
        signup(&directory, CapacityPolicy::Advisory, "Science Club", "temp@x.edu").unwrap();

        let message = unregister(&directory, "Science Club", "temp@x.edu").unwrap();
        assert_eq!(message, "temp@x.edu removed from Science Club");
        assert!(!roster(&directory, "Science Club").contains(&"temp@x.edu".to_string()));

        assert_eq!(
            unregister(&directory, "Science Club", "temp@x.edu"),
            Err(ActivityError::ParticipantNotFound)
        );
    }

    #[test]
    fn unregister_never_enrolled_leaves_directory_unchanged() {
        let directory = ActivityDirectory::seeded();
        let before = list_activities(&directory);

        assert_eq!(
            unregister(&directory, "Chess Club", "ghost@x.edu"),
            Err(ActivityError::ParticipantNotFound)
        );
        assert_eq!(
            unregister(&directory, "Nonexistent", "michael@mergington.edu"),
            Err(ActivityError::ActivityNotFound)
        );
        assert_eq!(list_activities(&directory), before);
    }

    #[test]
    fn unregister_preserves_order_of_remaining_participants() {
        let directory = ActivityDirectory::new(vec![Activity::new(
            "Drama Club",
            "Plays",
            "Thursdays",
            10,
            &["a@x.edu", "b@x.edu", "c@x.edu", "d@x.edu"],
        )]);

        unregister(&directory, "Drama Club", "b@x.edu").unwrap();

        assert_eq!(roster(&directory, "Drama Club"), ["a@x.edu", "c@x.edu", "d@x.edu"]);
    }

    #[test]
    fn signup_then_unregister_restores_exact_roster() {
        let directory = ActivityDirectory::seeded();
        let before = roster(&directory, "Programming Class");

        signup(&directory, CapacityPolicy::Advisory, "Programming Class", "round@trip.edu").unwrap();
        unregister(&directory, "Programming Class", "round@trip.edu").unwrap();

        assert_eq!(roster(&directory, "Programming Class"), before);
    }

    #[test]
    fn capacity_is_advisory_by_default() {
        let directory = ActivityDirectory::new(vec![Activity::new(
            "Math Olympiad",
            "Problems",
            "Fridays",
            1,
            &["james@mergington.edu"],
        )]);

        signup(&directory, CapacityPolicy::default(), "Math Olympiad", "extra@x.edu").unwrap();
        assert_eq!(roster(&directory, "Math Olympiad").len(), 2);
    }

    #[test]
    fn enforced_capacity_rejects_full_roster_after_duplicate_check() {
        let directory = ActivityDirectory::new(vec![Activity::new(
            "Math Olympiad",
            "Problems",
            "Fridays",
            1,
            &["james@mergington.edu"],
        )]);

        assert_eq!(
            signup(&directory, CapacityPolicy::Enforced, "Math Olympiad", "james@mergington.edu"),
            Err(ActivityError::DuplicateParticipant)
        );
        assert_eq!(
            signup(&directory, CapacityPolicy::Enforced, "Math Olympiad", "extra@x.edu"),
            Err(ActivityError::ActivityFull)
        );
        assert_eq!(roster(&directory, "Math Olympiad"), ["james@mergington.edu"]);
    }

    #[test]
    fn concurrent_signups_of_one_email_enroll_it_once() {
        let directory = ActivityDirectory::seeded();

        let successes = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    s.spawn(|| {
                        signup(&directory, CapacityPolicy::Advisory, "Science Club", "race@x.edu").is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(successes, 1);
        let names = roster(&directory, "Science Club");
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }
}
