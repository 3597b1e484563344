use crate::character::CharacterRepository;
use chrono::Utc;
use persona_core::{AppError, Character, CharacterChanges, CharacterStats, NewCharacter};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local repository used when no database is configured, and by tests.
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryCharacterRepository {
    characters: Mutex<HashMap<String, Character>>,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Character>>, AppError> {
        self.characters
            .lock()
            .map_err(|_| AppError::Internal("in-memory store poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn insert(&self, character: NewCharacter) -> Result<Character, AppError> {
        let mut characters = self.lock()?;
        if characters.contains_key(&character.id) {
            return Err(AppError::InvalidInput(format!(
                "Character {} already exists",
                character.id
            )));
        }
        let created = character.into_character(Utc::now());
        characters.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn exists(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.lock()?.contains_key(id))
    }

    async fn get(&self, id: &str) -> Result<Option<Character>, AppError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list(&self, include_inactive: bool) -> Result<Vec<Character>, AppError> {
        let mut list: Vec<Character> = self
            .lock()?
            .values()
            .filter(|c| include_inactive || c.is_active)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn update(
        &self,
        id: &str,
        changes: CharacterChanges,
    ) -> Result<Option<Character>, AppError> {
        let mut characters = self.lock()?;
        Ok(characters.get_mut(id).map(|character| {
            changes.apply_to(character, Utc::now());
            character.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.lock()?.remove(id).is_some())
    }

    async fn stats(&self) -> Result<CharacterStats, AppError> {
        let characters = self.lock()?;
        let total = characters.len() as i64;
        let active = characters.values().filter(|c| c.is_active).count() as i64;
        Ok(CharacterStats {
            total,
            active,
            inactive: total - active,
        })
    }
}
