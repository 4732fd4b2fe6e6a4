#[cfg(test)]
mod tests {
    use keka_clicker::api::browser::DEFAULT_DEVTOOLS_URL;
    use keka_clicker::libs::config::{BrowserConfig, Config, CONFIG_FILE_NAME};
    use keka_clicker::libs::data_storage::DataStorage;
    use keka_clicker::libs::storage::{Store, StoreKey, STORE_FILE_NAME};
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// Tests in this file point HOME at their own directory, so they must not overlap.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Sets up a temporary directory to act as the user's home/appdata directory.
    struct ConfigTestContext {
        _guard: MutexGuard<'static, ()>,
        _temp_dir: TempDir,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            ConfigTestContext {
                _guard: guard,
                _temp_dir: temp_dir,
            }
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_read_nonexistent_config(_ctx: &mut ConfigTestContext) {
        let config = Config::read().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.devtools_url(), DEFAULT_DEVTOOLS_URL);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_config(_ctx: &mut ConfigTestContext) {
        let config = Config {
            browser: Some(BrowserConfig {
                devtools_url: "http://localhost:9333".to_string(),
            }),
        };
        config.save().unwrap();

        let read_config = Config::read().unwrap();
        assert_eq!(read_config, config);
        assert_eq!(read_config.devtools_url(), "http://localhost:9333");
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_store_lives_in_data_directory(_ctx: &mut ConfigTestContext) {
        let store = Store::new().unwrap();
        store.set_string(StoreKey::Subdomain, "acme").unwrap();

        assert_eq!(store.path(), DataStorage::new().get_path(STORE_FILE_NAME).unwrap());
        assert!(store.path().exists());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_delete_removes_config_and_store(_ctx: &mut ConfigTestContext) {
        Config::default().save().unwrap();
        Store::new().unwrap().set_string(StoreKey::Token, "token").unwrap();

        Config::delete().unwrap();

        let storage = DataStorage::new();
        assert!(!storage.get_path(CONFIG_FILE_NAME).unwrap().exists());
        assert!(!storage.get_path(STORE_FILE_NAME).unwrap().exists());
        assert_eq!(Store::new().unwrap().get_string(StoreKey::Token).unwrap(), "");
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_delete_without_files_is_ok(_ctx: &mut ConfigTestContext) {
        assert!(Config::delete().is_ok());
    }
}
