use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use crate::models::{Activity, ActivityListing};

/// In-memory activity directory.
///
/// Activities are fixed at construction; only rosters change afterwards. All
/// roster mutations go through [`ActivityDirectory::with_activity_mut`], which
/// holds the write lock for the whole closure so a check-then-mutate sequence
/// cannot interleave with another writer.
#[derive(Debug)]
pub struct ActivityDirectory {
    activities: RwLock<Vec<Activity>>,
}

impl ActivityDirectory {
    /// Builds a directory from explicit activities. A repeated name keeps the
    /// first occurrence.
    pub fn new(activities: Vec<Activity>) -> Self {
        let mut unique: Vec<Activity> = Vec::with_capacity(activities.len());
        for activity in activities {
            if unique.iter().any(|a| a.name == activity.name) {
                warn!("Duplicate activity {:?} dropped from directory", activity.name);
                continue;
            }
            unique.push(activity);
        }

        Self {
            activities: RwLock::new(unique),
        }
    }

    /// Directory with the school's standard activity set.
    pub fn seeded() -> Self {
        Self::new(seed_activities())
    }

    pub fn snapshot(&self) -> ActivityListing {
        ActivityListing(self.read().clone())
    }

    pub fn activity_count(&self) -> usize {
        self.read().len()
    }

    /// Runs `f` on the activity named exactly `name` under the write lock.
    /// Returns `None` when no such activity exists.
    pub fn with_activity_mut<T>(&self, name: &str, f: impl FnOnce(&mut Activity) -> T) -> Option<T> {
        let mut activities = self.write();
        activities.iter_mut().find(|a| a.name == name).map(f)
    }

    // Every mutation is a single push or remove after its checks, so the data
    // behind a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Activity>> {
        self.activities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Activity>> {
        self.activities.write().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn seed_activities() -> Vec<Activity> {
    vec![
        Activity::new(
            "Chess Club",
            "Learn strategies and compete in chess tournaments",
            "Fridays, 3:30 PM - 5:00 PM",
            12,
            &["michael@mergington.edu", "daniel@mergington.edu"],
        ),
        Activity::new(
            "Programming Class",
            "Learn programming fundamentals and build software projects",
            "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
            20,
            &["emma@mergington.edu", "sophia@mergington.edu"],
        ),
        Activity::new(
            "Gym Class",
            "Physical education and sports activities",
            "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
            30,
            &["john@mergington.edu", "olivia@mergington.edu"],
        ),
        Activity::new(
            "Soccer Team",
            "Train with the school team and compete in district matches",
            "Tuesdays and Thursdays, 4:00 PM - 5:30 PM",
            22,
            &["liam@mergington.edu", "noah@mergington.edu"],
        ),
        Activity::new(
            "Basketball Club",
            "Practice basketball skills and play friendly games",
            "Wednesdays, 3:30 PM - 5:00 PM",
            15,
            &["ava@mergington.edu", "mia@mergington.edu"],
        ),
        Activity::new(
            "Art Workshop",
            "Explore painting, drawing and sculpture",
            "Mondays, 3:30 PM - 5:00 PM",
            18,
            &["amelia@mergington.edu", "harper@mergington.edu"],
        ),
        Activity::new(
            "Drama Club",
            "Act in and produce the school's plays and performances",
            "Thursdays, 3:30 PM - 5:30 PM",
            20,
            &["ella@mergington.edu", "scarlett@mergington.edu"],
        ),
        Activity::new(
            "Math Olympiad",
            "Solve challenging problems and prepare for math competitions",
            "Fridays, 2:00 PM - 3:30 PM",
            10,
            &["james@mergington.edu", "benjamin@mergington.edu"],
        ),
        Activity::new(
            "Science Club",
            "Run experiments and explore scientific concepts",
            "Wednesdays, 4:00 PM - 5:00 PM",
            14,
            &["charlotte@mergington.edu", "henry@mergington.edu"],
        ),
    ]
}
