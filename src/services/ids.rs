use uuid::Uuid;

use super::IdGenerator;

/// Generates random (v4) UUIDs
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
