//! Configuration-related messages

pub struct ConfigMessages {
    pub not_found: &'static str,
    pub not_found_hint: &'static str,
    pub kuboard_section_missing: &'static str,
    pub loaded: &'static str,
}

pub const CONFIG_MESSAGES: ConfigMessages = ConfigMessages {
    not_found: "Config file not found: {path}",
    not_found_hint: "💡 Set KB_CONFIG or pass --config to point at a config.yaml",
    kuboard_section_missing: "No 'kuboard' section in configuration",
    loaded: "Configuration loaded from {path}: {sites} site(s), {clusters} cluster mapping(s)",
};
