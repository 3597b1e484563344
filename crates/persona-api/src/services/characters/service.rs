use std::sync::Arc;

use persona_core::{
    generate_character_id, AppError, Character, CharacterChanges, CharacterStats, ImageRole,
    NewCharacter,
};
use persona_db::CharacterRepository;
use persona_processing::TransformOverrides;

use super::form::{CharacterForm, FilePart};
use crate::services::upload::{StoredImage, UploadError, UploadOrchestrator};

/// Attempts at finding an unused character id before giving up.
const ID_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct CharacterService {
    repository: Arc<dyn CharacterRepository>,
    uploads: Arc<UploadOrchestrator>,
}

impl CharacterService {
    pub fn new(repository: Arc<dyn CharacterRepository>, uploads: Arc<UploadOrchestrator>) -> Self {
        Self {
            repository,
            uploads,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.uploads.max_upload_bytes()
    }

    /// Create a character. The profile image must process and store; the
    /// background image is optional and its failure only leaves it unset.
    #[tracing::instrument(skip_all)]
    pub async fn create(&self, form: CharacterForm) -> Result<Character, AppError> {
        let draft = form.into_create()?;
        let id = self.allocate_id().await?;

        let profile = self.upload(&id, ImageRole::Profile, draft.image).await?;
        let background_image_url = match draft.background_image {
            Some(part) => self.upload_background(&id, part).await,
            None => None,
        };

        let character = self
            .repository
            .insert(NewCharacter {
                id,
                name: draft.input.name,
                description: draft.input.description,
                personality: draft.input.personality,
                image_url: profile.url,
                background_image_url,
                accent_color: draft.input.accent_color,
                text_color: draft.input.text_color,
                traits: draft.traits,
                interests: draft.interests,
            })
            .await?;

        tracing::info!(
            character_id = %character.id,
            backend = %profile.backend,
            has_background = character.background_image_url.is_some(),
            "Character created"
        );

        Ok(character)
    }

    /// Partial update. A new profile image replaces the old URL (the old object
    /// stays in storage); a failed background upload keeps the previous value.
    #[tracing::instrument(skip(self, form))]
    pub async fn update(&self, id: &str, form: CharacterForm) -> Result<Character, AppError> {
        let draft = form.into_update()?;

        if self.repository.get(id).await?.is_none() {
            return Err(not_found(id));
        }

        let image_url = match draft.image {
            Some(part) => Some(self.upload(id, ImageRole::Profile, part).await?.url),
            None => None,
        };
        let background_image_url = match draft.background_image {
            Some(part) => self.upload_background(id, part).await,
            None => None,
        };

        let changes = CharacterChanges {
            name: draft.input.name,
            description: draft.input.description,
            personality: draft.input.personality,
            image_url,
            background_image_url,
            accent_color: draft.input.accent_color,
            text_color: draft.input.text_color,
            traits: draft.traits,
            interests: draft.interests,
            is_active: draft.is_active,
        };

        let character = self
            .repository
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(character_id = %id, "Character updated");
        Ok(character)
    }

    pub async fn get_active(&self, id: &str) -> Result<Character, AppError> {
        self.repository
            .get(id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| not_found(id))
    }

    pub async fn list_active(&self) -> Result<Vec<Character>, AppError> {
        self.repository.list(false).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn soft_delete(&self, id: &str) -> Result<(), AppError> {
        self.get_active(id).await?;
        self.set_active(id, false).await?;
        tracing::info!(character_id = %id, "Character deactivated");
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<Character>, AppError> {
        self.repository.list(true).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn restore(&self, id: &str) -> Result<Character, AppError> {
        let character = self.set_active(id, true).await?;
        tracing::info!(character_id = %id, "Character restored");
        Ok(character)
    }

    /// Remove the record for good. Stored images are left in place.
    #[tracing::instrument(skip(self))]
    pub async fn hard_delete(&self, id: &str) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(character_id = %id, "Character permanently deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<CharacterStats, AppError> {
        self.repository.stats().await
    }

    async fn set_active(&self, id: &str, is_active: bool) -> Result<Character, AppError> {
        let changes = CharacterChanges {
            is_active: Some(is_active),
            ..Default::default()
        };
        self.repository
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn allocate_id(&self) -> Result<String, AppError> {
        for _ in 0..ID_ATTEMPTS {
            let id = generate_character_id();
            if !self.repository.exists(&id).await? {
                return Ok(id);
            }
            tracing::debug!(character_id = %id, "Generated id already taken, retrying");
        }
        Err(AppError::Internal(
            "Could not allocate a unique character id".to_string(),
        ))
    }

    async fn upload(
        &self,
        owner_id: &str,
        role: ImageRole,
        part: FilePart,
    ) -> Result<StoredImage, UploadError> {
        let staged = self
            .uploads
            .stage(
                &part.bytes,
                part.filename.as_deref(),
                part.content_type.as_deref(),
            )
            .await?;
        self.uploads
            .process_and_store_detached(
                staged,
                owner_id.to_string(),
                role,
                TransformOverrides::default(),
            )
            .await
    }

    async fn upload_background(&self, owner_id: &str, part: FilePart) -> Option<String> {
        match self.upload(owner_id, ImageRole::Background, part).await {
            Ok(stored) => Some(stored.url),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    character_id = %owner_id,
                    "Background image upload failed, continuing without it"
                );
                None
            }
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Character {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{png, CountingJanitor, MockStorage};
    use bytes::Bytes;
    use persona_core::{ImageConfig, ImageDefaults, StorageBackend};
    use persona_db::InMemoryCharacterRepository;
    use persona_storage::{Storage, StorageSet};

    struct Fixture {
        _tmp: tempfile::TempDir,
        remote: Arc<MockStorage>,
        local: Arc<MockStorage>,
        janitor: Arc<CountingJanitor>,
        repository: Arc<InMemoryCharacterRepository>,
        service: CharacterService,
    }

    fn fixture(remote: MockStorage, local: MockStorage) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let remote = Arc::new(remote);
        let local = Arc::new(local);
        let janitor = Arc::new(CountingJanitor::default());
        let images = ImageConfig {
            profile: ImageDefaults {
                width: 400,
                height: 400,
                quality: 85,
            },
            background: ImageDefaults {
                width: 1200,
                height: 800,
                quality: 85,
            },
            max_upload_bytes: 1024 * 1024,
            tmp_dir: tmp.path().to_path_buf(),
        };
        let uploads = UploadOrchestrator::new(
            StorageSet::new(
                Some(remote.clone() as Arc<dyn Storage>),
                local.clone() as Arc<dyn Storage>,
            ),
            images,
        )
        .with_janitor(janitor.clone());
        let repository = Arc::new(InMemoryCharacterRepository::new());
        let service = CharacterService::new(repository.clone(), Arc::new(uploads));
        Fixture {
            _tmp: tmp,
            remote,
            local,
            janitor,
            repository,
            service,
        }
    }

    fn image_part(data: Vec<u8>) -> FilePart {
        FilePart {
            bytes: Bytes::from(data),
            filename: Some("image.png".to_string()),
            content_type: Some("image/png".to_string()),
        }
    }

    fn create_form() -> CharacterForm {
        CharacterForm {
            name: Some("Mira".to_string()),
            description: Some("A lighthouse keeper".to_string()),
            personality: Some("Warm and wry".to_string()),
            traits: Some(r#"["patient","curious"]"#.to_string()),
            interests: Some("storms, tides".to_string()),
            image: Some(image_part(png(400, 400))),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_with_profile_only() {
        let f = fixture(
            MockStorage::new(StorageBackend::Remote),
            MockStorage::new(StorageBackend::Local),
        );

        let character = f.service.create(create_form()).await.unwrap();

        assert!(character.is_active);
        assert_eq!(character.id.len(), 9);
        assert!(character
            .image_url
            .starts_with(&format!("https://cdn.test/characters/{}/profile-", character.id)));
        assert!(character.background_image_url.is_none());
        assert_eq!(character.traits, vec!["patient", "curious"]);
        assert_eq!(character.interests, vec!["storms", "tides"]);
        assert_eq!(f.remote.put_count(), 1);
        assert_eq!(f.local.put_count(), 0);
        assert_eq!(f.janitor.count(), 1);

        let stored = f.repository.get(&character.id).await.unwrap().unwrap();
        assert_eq!(stored, character);
    }

    #[tokio::test]
    async fn test_create_without_image_makes_no_storage_calls() {
        let f = fixture(
            MockStorage::new(StorageBackend::Remote),
            MockStorage::new(StorageBackend::Local),
        );
        let form = CharacterForm {
            image: None,
            ..create_form()
        };

        let err = f.service.create(form).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(f.remote.put_count(), 0);
        assert_eq!(f.local.put_count(), 0);
        assert_eq!(f.janitor.count(), 0);
        assert!(f.service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_profile_persists_nothing() {
        let f = fixture(
            MockStorage::new(StorageBackend::Remote),
            MockStorage::new(StorageBackend::Local),
        );
        let form = CharacterForm {
            image: Some(image_part(b"not an image".to_vec())),
            ..create_form()
        };

        let err = f.service.create(form).await.unwrap_err();

        assert!(matches!(err, AppError::ImageProcessing(_)));
        assert_eq!(f.remote.put_count(), 0);
        assert_eq!(f.janitor.count(), 1);
        assert!(f.service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_persists_nothing() {
        let f = fixture(
            MockStorage::failing(StorageBackend::Remote),
            MockStorage::failing(StorageBackend::Local),
        );

        let err = f.service.create(create_form()).await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(f.service.list_all().await.unwrap().is_empty());
        assert_eq!(f.janitor.count(), 1);
    }

    #[tokio::test]
    async fn test_bad_background_is_soft_failure() {
        let f = fixture(
            MockStorage::new(StorageBackend::Remote),
            MockStorage::new(StorageBackend::Local),
        );
        let form = CharacterForm {
            background_image: Some(image_part(b"garbage".to_vec())),
            ..create_form()
        };

        let character = f.service.create(form).await.unwrap();

        assert!(character.background_image_url.is_none());
        assert_eq!(f.remote.put_count(), 1);
        assert_eq!(f.janitor.count(), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_profile_and_keeps_background_on_failure() {
        let f = fixture(
            MockStorage::new(StorageBackend::Remote),
            MockStorage::new(StorageBackend::Local),
        );
        let form = CharacterForm {
            background_image: Some(image_part(png(1600, 900))),
            ..create_form()
        };
        let created = f.service.create(form).await.unwrap();
        let old_background = created.background_image_url.clone();
        assert!(old_background.is_some());

        // the two uploads of the same role need distinct timestamps
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let update = CharacterForm {
            name: Some("Mira II".to_string()),
            image: Some(image_part(png(300, 500))),
            background_image: Some(image_part(b"broken".to_vec())),
            ..Default::default()
        };
        let updated = f.service.update(&created.id, update).await.unwrap();

        assert_eq!(updated.name, "Mira II");
        assert_eq!(updated.description, created.description);
        assert_ne!(updated.image_url, created.image_url);
        assert_eq!(updated.background_image_url, old_background);
        assert!(updated.updated_at >= created.updated_at);

        // old object is not removed
        assert_eq!(f.remote.objects.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_unknown_character() {
        let f = fixture(
            MockStorage::new(StorageBackend::Remote),
            MockStorage::new(StorageBackend::Local),
        );
        let update = CharacterForm {
            image: Some(image_part(png(10, 10))),
            ..Default::default()
        };

        let err = f.service.update("999999999", update).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(f.remote.put_count(), 0);
    }

    #[tokio::test]
    async fn test_soft_delete_restore_and_hard_delete() {
        let f = fixture(
            MockStorage::new(StorageBackend::Remote),
            MockStorage::new(StorageBackend::Local),
        );
        let created = f.service.create(create_form()).await.unwrap();

        f.service.soft_delete(&created.id).await.unwrap();
        assert!(matches!(
            f.service.get_active(&created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(f.service.list_active().await.unwrap().is_empty());
        assert_eq!(f.service.list_all().await.unwrap().len(), 1);
        assert!(matches!(
            f.service.soft_delete(&created.id).await,
            Err(AppError::NotFound(_))
        ));

        let stats = f.service.stats().await.unwrap();
        assert_eq!((stats.total, stats.active, stats.inactive), (1, 0, 1));

        let restored = f.service.restore(&created.id).await.unwrap();
        assert!(restored.is_active);
        assert_eq!(f.service.get_active(&created.id).await.unwrap().id, created.id);

        f.service.hard_delete(&created.id).await.unwrap();
        assert!(f.service.list_all().await.unwrap().is_empty());
        assert!(matches!(
            f.service.hard_delete(&created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.service.restore(&created.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
