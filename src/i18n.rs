// ==========================================
// Internationalisierung (i18n)
// ==========================================
// rust-i18n, Deutsch (Standard) und Englisch
// ==========================================
// Hinweis: das rust_i18n::i18n!-Makro wird in lib.rs initialisiert
// ==========================================

/// Liefert die aktuelle Sprache
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Setzt die Sprache
///
/// # Parameter
/// - locale: Sprachcode ("de" oder "en")
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Übersetzt eine Meldung (ohne Parameter)
///
/// # Beispiel
/// ```no_run
/// use stitch_admin::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Übersetzt eine Meldung (mit Parametern)
///
/// # Beispiel
/// ```no_run
/// use stitch_admin::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/garn.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Die Locale von rust-i18n ist globaler Zustand; Rust-Tests laufen
    // parallel, daher werden die i18n-Tests hier serialisiert.
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("de");
        assert_eq!(current_locale(), "de");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("de");
        let msg = t("common.success");
        assert_eq!(msg, "Vorgang erfolgreich");

        set_locale("en");
        let msg = t("common.success");
        assert_eq!(msg, "Operation successful");

        set_locale("de");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("de");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/garn.csv")]);
        assert!(msg.contains("/tmp/garn.csv"));
        assert!(msg.contains("Datei nicht gefunden"));

        set_locale("de");
    }
}
