// This module implements the small, closed set of named options read once at runtime
// startup. Options come from a property list whose keys carry the "jitci." prefix (the
// equivalent of -D flags handed to the VM) or from JITCI_* environment variables. Each
// option has a type, a default and a help line, and remembers whether its value was
// explicitly supplied so the flag table can mark defaults with ":=". Boolean values parse
// "true" case-insensitively and treat anything else as false.

//! Runtime options.

use std::fmt;
use std::io::{self, Write};

/// Prefix of property keys that name runtime options.
pub const OPTION_PROPERTY_PREFIX: &str = "jitci.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Compiler,
    InitTimer,
    PrintConfig,
    PrintFlags,
    ShowFlags,
    TraceMethodDataFilter,
}

impl OptionKey {
    pub const ALL: [OptionKey; 6] = [
        OptionKey::Compiler,
        OptionKey::InitTimer,
        OptionKey::PrintConfig,
        OptionKey::PrintFlags,
        OptionKey::ShowFlags,
        OptionKey::TraceMethodDataFilter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OptionKey::Compiler => "Compiler",
            OptionKey::InitTimer => "InitTimer",
            OptionKey::PrintConfig => "PrintConfig",
            OptionKey::PrintFlags => "PrintFlags",
            OptionKey::ShowFlags => "ShowFlags",
            OptionKey::TraceMethodDataFilter => "TraceMethodDataFilter",
        }
    }

    /// Environment variable carrying this option.
    pub fn env_var(self) -> &'static str {
        match self {
            OptionKey::Compiler => "JITCI_COMPILER",
            OptionKey::InitTimer => "JITCI_INIT_TIMER",
            OptionKey::PrintConfig => "JITCI_PRINT_CONFIG",
            OptionKey::PrintFlags => "JITCI_PRINT_FLAGS",
            OptionKey::ShowFlags => "JITCI_SHOW_FLAGS",
            OptionKey::TraceMethodDataFilter => "JITCI_TRACE_METHOD_DATA_FILTER",
        }
    }

    pub fn from_name(name: &str) -> Option<OptionKey> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    fn is_boolean(self) -> bool {
        !matches!(self, OptionKey::Compiler | OptionKey::TraceMethodDataFilter)
    }

    pub fn type_name(self) -> &'static str {
        if self.is_boolean() {
            "boolean"
        } else {
            "String"
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            OptionKey::Compiler => "Selects the system compiler.",
            OptionKey::InitTimer => "Specifies if initialization timing is enabled.",
            OptionKey::PrintConfig => "Prints VM configuration and exits.",
            OptionKey::PrintFlags => "Prints all jitci flags and exits.",
            OptionKey::ShowFlags => "Prints all jitci flags and continues.",
            OptionKey::TraceMethodDataFilter => "",
        }
    }

    pub fn default_value(self) -> OptionValue {
        if self.is_boolean() {
            OptionValue::Bool(false)
        } else {
            OptionValue::Str(None)
        }
    }

    fn parse(self, raw: &str) -> OptionValue {
        if self.is_boolean() {
            OptionValue::Bool(raw.eq_ignore_ascii_case("true"))
        } else {
            OptionValue::Str(Some(raw.to_string()))
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Bool(bool),
    /// `None` when unset.
    Str(Option<String>),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(Some(s)) => f.write_str(s),
            OptionValue::Str(None) => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OptionSlot {
    value: OptionValue,
    is_default: bool,
}

/// Values of all runtime options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    slots: Vec<OptionSlot>,
}

impl Default for Options {
    fn default() -> Self {
        let slots = OptionKey::ALL
            .iter()
            .map(|k| OptionSlot {
                value: k.default_value(),
                is_default: true,
            })
            .collect();
        Self { slots }
    }
}

impl Options {
    /// All options at their defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from `jitci.<Name>=value` properties. Keys without the
    /// prefix are ignored, unknown option names are logged and ignored.
    pub fn from_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::new();
        options.apply_properties(properties);
        options
    }

    /// Override options with `jitci.<Name>=value` properties.
    pub fn apply_properties<I, K, V>(&mut self, properties: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in properties {
            let Some(name) = key.as_ref().strip_prefix(OPTION_PROPERTY_PREFIX) else {
                continue;
            };
            match OptionKey::from_name(name) {
                Some(option) => self.set(option, value.as_ref()),
                None => log::warn!("ignoring unknown option property {}", key.as_ref()),
            }
        }
    }

    /// Read options from `JITCI_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read options through `lookup`, called with each option's environment
    /// variable name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::new();
        for key in OptionKey::ALL {
            if let Some(value) = lookup(key.env_var()) {
                options.set(key, &value);
            }
        }
        options
    }

    /// Explicitly set `key` from its textual form.
    pub fn set(&mut self, key: OptionKey, raw: &str) {
        self.slots[key as usize] = OptionSlot {
            value: key.parse(raw),
            is_default: false,
        };
    }

    pub fn with(mut self, key: OptionKey, raw: &str) -> Self {
        self.set(key, raw);
        self
    }

    pub fn value(&self, key: OptionKey) -> &OptionValue {
        &self.slots[key as usize].value
    }

    pub fn is_default(&self, key: OptionKey) -> bool {
        self.slots[key as usize].is_default
    }

    /// # Panics
    /// If `key` is not a boolean option.
    pub fn get_bool(&self, key: OptionKey) -> bool {
        match self.value(key) {
            OptionValue::Bool(b) => *b,
            OptionValue::Str(_) => panic!("option {} is not a boolean", key),
        }
    }

    /// # Panics
    /// If `key` is not a string option.
    pub fn get_string(&self, key: OptionKey) -> Option<&str> {
        match self.value(key) {
            OptionValue::Str(s) => s.as_deref(),
            OptionValue::Bool(_) => panic!("option {} is not a string", key),
        }
    }

    /// The requested compiler name, if any.
    pub fn compiler(&self) -> Option<&str> {
        self.get_string(OptionKey::Compiler)
    }

    pub fn init_timer(&self) -> bool {
        self.get_bool(OptionKey::InitTimer)
    }

    /// Print the option table. Explicitly set values are marked with ` =`,
    /// defaults with `:=`.
    pub fn print_flags<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "[List of jitci options]")?;
        for key in OptionKey::ALL {
            let assign = if self.is_default(key) { ":=" } else { " =" };
            writeln!(
                out,
                "{:>9} {:<40} {} {:<14} {}",
                key.type_name(),
                key.name(),
                assign,
                self.value(key).to_string(),
                key.help()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::new();
        assert_eq!(options.compiler(), None);
        assert!(!options.init_timer());
        assert!(OptionKey::ALL.iter().all(|k| options.is_default(*k)));
    }

    #[test]
    fn test_from_properties() {
        let options = Options::from_properties([
            ("jitci.Compiler", "graal"),
            ("jitci.ShowFlags", "TRUE"),
            ("jitci.PrintFlags", "yes"),
            ("jitci.NoSuchOption", "1"),
            ("Compiler", "ignored"),
        ]);
        assert_eq!(options.compiler(), Some("graal"));
        assert!(options.get_bool(OptionKey::ShowFlags));
        // Anything but "true" is false, but still explicit.
        assert!(!options.get_bool(OptionKey::PrintFlags));
        assert!(!options.is_default(OptionKey::PrintFlags));
        assert!(options.is_default(OptionKey::InitTimer));
    }

    #[test]
    fn test_from_lookup_uses_env_names() {
        let options = Options::from_lookup(|var| match var {
            "JITCI_INIT_TIMER" => Some("true".to_string()),
            "JITCI_TRACE_METHOD_DATA_FILTER" => Some("Foo.bar".to_string()),
            _ => None,
        });
        assert!(options.init_timer());
        assert_eq!(options.get_string(OptionKey::TraceMethodDataFilter), Some("Foo.bar"));
    }

    #[test]
    fn test_print_flags_table() {
        let options = Options::new().with(OptionKey::Compiler, "stub");
        let mut out = Vec::new();
        options.print_flags(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "[List of jitci options]");
        assert_eq!(lines.len(), 7);
        assert!(lines[1].starts_with("   String Compiler "));
        assert!(lines[1].contains(" = stub "));
        assert!(lines[2].starts_with("  boolean InitTimer"));
        assert!(lines[2].contains(":= false"));
        assert!(lines[6].contains(":= null"));
    }
}
