//! Resource services: validation, persistence and list-column encoding for
//! every content type.
//!
//! Deletes are lenient across the board: removing an id that does not exist
//! succeeds.

mod bootcamp;
mod contact;
mod journal;
mod meme;
mod story;

pub use bootcamp::BootcampService;
pub use contact::ContactService;
pub use journal::JournalService;
pub use meme::MemeService;
pub use story::StoryService;

use sqlx::SqlitePool;

/// One handle per resource, all sharing the same pool.
#[derive(Clone)]
pub struct Services {
    pub bootcamps: BootcampService,
    pub journal: JournalService,
    pub memes: MemeService,
    pub stories: StoryService,
    pub contacts: ContactService,
}

impl Services {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            bootcamps: BootcampService::new(pool.clone()),
            journal: JournalService::new(pool.clone()),
            memes: MemeService::new(pool.clone()),
            stories: StoryService::new(pool.clone()),
            contacts: ContactService::new(pool),
        }
    }
}
