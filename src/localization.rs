//! Fluent-based message catalog with per-user locale lookup.

use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, OnceLock};
use unic_langid::LanguageIdentifier;

const FALLBACK_LOCALE: &str = "en";

/// Localization manager for the notes bot
pub struct LocalizationManager {
    bundles: HashMap<String, Arc<FluentBundle<FluentResource>>>,
}

impl LocalizationManager {
    /// Create a manager with the fallback locale plus any locale found
    /// under `./locales/<locale>/main.ftl`
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        let en_locale: LanguageIdentifier = FALLBACK_LOCALE.parse()?;
        bundles.insert(
            FALLBACK_LOCALE.to_string(),
            Arc::new(Self::create_bundle(&en_locale)),
        );

        if let Ok(entries) = fs::read_dir("./locales") {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if name == FALLBACK_LOCALE || bundles.contains_key(&name) {
                    continue;
                }
                if let Ok(locale) = name.parse::<LanguageIdentifier>() {
                    bundles.insert(name, Arc::new(Self::create_bundle(&locale)));
                }
            }
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: &LanguageIdentifier) -> FluentBundle<FluentResource> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        bundle.set_use_isolating(false);

        let resource_path = format!("./locales/{}/main.ftl", locale);
        if let Ok(content) = fs::read_to_string(&resource_path) {
            if let Ok(resource) = FluentResource::try_new(content) {
                let _ = bundle.add_resource(resource);
            }
        }

        bundle
    }

    fn bundle_for(&self, language_code: Option<&str>) -> &FluentBundle<FluentResource> {
        // "en-US" and friends collapse to the primary subtag
        let primary = language_code
            .map(|code| code.split(['-', '_']).next().unwrap_or(code))
            .unwrap_or(FALLBACK_LOCALE);

        self.bundles
            .get(primary)
            .or_else(|| self.bundles.get(FALLBACK_LOCALE))
            .expect("fallback locale bundle always present")
    }

    /// Get a localized message for the given locale
    pub fn get_message(
        &self,
        key: &str,
        language_code: Option<&str>,
        args: Option<&FluentArgs>,
    ) -> String {
        let bundle = self.bundle_for(language_code);

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut value = String::new();
        let _ = bundle.write_pattern(&mut value, pattern, args, &mut vec![]);
        value
    }
}

/// Global localization instance
static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager. Safe to call more than once;
/// later calls are no-ops.
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

/// Get the global localization manager
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER
        .get()
        .expect("Localization manager not initialized")
}

/// Get a localized message for a user's language code
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    get_localization_manager().get_message(key, language_code, None)
}

/// Get a localized message with arguments for a user's language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let fluent_args = FluentArgs::from_iter(
        args.iter()
            .map(|(name, value)| (*name, FluentValue::from(*value))),
    );
    get_localization_manager().get_message(key, language_code, Some(&fluent_args))
}
