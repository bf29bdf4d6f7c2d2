//! Actors: characters, global entities, and field entity instances

mod actor_key;
mod character;
mod entity_instance;

pub use actor_key::{ActorKey, ActorMut, ActorRef};
pub use character::Character;
pub use entity_instance::EntityInstance;
