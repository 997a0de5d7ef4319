//! Callback-data grammar constants (§6). Centralized so every handler and
//! every adapter builds/parses the same literal strings.

pub const SET_PREFIX: &str = "set_";
pub const TWEAK_GEN_PREFIX: &str = "tweak_gen:";
pub const TWEAK_PARAM_EDIT_PREFIX: &str = "tpe_";
pub const TWEAK_APPLY_PREFIX: &str = "tweak_apply:";
pub const TWEAK_CANCEL_PREFIX: &str = "tweak_cancel:";
pub const TWEAK_MENU_RENDER_PREFIX: &str = "tweak_gen_menu_render:";
pub const RERUN_GEN_PREFIX: &str = "rerun_gen:";
pub const RATE_GEN_PREFIX: &str = "rate_gen:";
pub const VIEW_GEN_INFO_PREFIX: &str = "view_gen_info:";
pub const VIEW_SPELL_STEP_PREFIX: &str = "view_spell_step:";
pub const RESTORE_DELIVERY_PREFIX: &str = "restore_delivery:";
pub const HIDE_MENU: &str = "hide_menu";
pub const LORA_PREFIX: &str = "lora:";
pub const WALLET_PREFIX: &str = "wallet:";
pub const LINK_PREFIX: &str = "link:";

/// Reply-context discriminants (§6 "ReplyContext grammar").
pub const SETTINGS_PARAM_EDIT: &str = "settings_param_edit";
pub const TWEAK_PARAM_EDIT: &str = "tweak_param_edit";
pub const LORA_IMPORT_URL: &str = "lora_import_url";
pub const WALLET_MAGIC_AMOUNT: &str = "wallet_magic_amount";

/// Build `tweak_gen:<genId>`.
pub fn tweak_gen(generation_id: &str) -> String {
    format!("{TWEAK_GEN_PREFIX}{generation_id}")
}

/// Build `tpe_<token>_<paramName>`.
pub fn tweak_param_edit(token: &str, param_name: &str) -> String {
    format!("{TWEAK_PARAM_EDIT_PREFIX}{token}_{param_name}")
}

pub fn tweak_apply(token: &str) -> String {
    format!("{TWEAK_APPLY_PREFIX}{token}")
}

pub fn tweak_cancel(token: &str) -> String {
    format!("{TWEAK_CANCEL_PREFIX}{token}")
}

/// Build `tweak_gen_menu_render:<genId>` — a manual refresh of an
/// already-open tweak menu, e.g. after a transport edit error leaves the
/// displayed keyboard stale.
pub fn tweak_menu_render(generation_id: &str) -> String {
    format!("{TWEAK_MENU_RENDER_PREFIX}{generation_id}")
}

/// Build `rerun_gen:<genId>:<pressCount>`.
pub fn rerun_gen(generation_id: &str, press_count: u32) -> String {
    format!("{RERUN_GEN_PREFIX}{generation_id}:{press_count}")
}

pub fn rate_gen(generation_id: &str, kind: &str) -> String {
    format!("{RATE_GEN_PREFIX}{generation_id}:{kind}")
}

pub fn view_gen_info(generation_id: &str) -> String {
    format!("{VIEW_GEN_INFO_PREFIX}{generation_id}")
}

pub fn view_spell_step(generation_id: &str, idx: usize) -> String {
    format!("{VIEW_SPELL_STEP_PREFIX}{generation_id}:{idx}")
}

pub fn restore_delivery(generation_id: &str) -> String {
    format!("{RESTORE_DELIVERY_PREFIX}{generation_id}")
}

/// Parse `tpe_<token>_<paramName>` (the part after the `tpe_` prefix has
/// already been stripped by the dispatcher).
pub fn parse_tweak_param_edit_remainder(remainder: &str) -> Option<(&str, &str)> {
    remainder.split_once('_')
}

/// Parse `<genId>:<kind>` (rating kind).
pub fn parse_colon_pair(remainder: &str) -> Option<(&str, &str)> {
    remainder.split_once(':')
}

/// Parse `<genId>:<pressCount>` where the count is optional (defaults to 0).
pub fn parse_rerun_remainder(remainder: &str) -> (&str, u32) {
    match remainder.split_once(':') {
        Some((gen_id, count)) => (gen_id, count.parse().unwrap_or(0)),
        None => (remainder, 0),
    }
}

/// `lora:<action>:<…>` (§4.9, §6 "lora:<action>:<…>").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoraAction {
    Category { category: String, checkpoint: String, page: u32 },
    View { slug: String },
    Favorite { slug: String, on: bool },
}

pub fn lora_category(category: &str, checkpoint: &str, page: u32) -> String {
    format!("{LORA_PREFIX}cat:{category}:{checkpoint}:{page}")
}

pub fn lora_view(slug: &str) -> String {
    format!("{LORA_PREFIX}view:{slug}")
}

pub fn lora_favorite(slug: &str, on: bool) -> String {
    format!("{LORA_PREFIX}fav:{slug}:{}", if on { 1 } else { 0 })
}

pub fn parse_lora_action(remainder: &str) -> Option<LoraAction> {
    if let Some(rest) = remainder.strip_prefix("cat:") {
        let mut parts = rest.splitn(3, ':');
        let category = parts.next()?.to_string();
        let checkpoint = parts.next()?.to_string();
        let page = parts.next()?.parse().ok()?;
        return Some(LoraAction::Category { category, checkpoint, page });
    }
    if let Some(slug) = remainder.strip_prefix("view:") {
        return Some(LoraAction::View { slug: slug.to_string() });
    }
    if let Some(rest) = remainder.strip_prefix("fav:") {
        let (slug, on) = rest.rsplit_once(':')?;
        return Some(LoraAction::Favorite {
            slug: slug.to_string(),
            on: on == "1",
        });
    }
    None
}

/// `wallet:<action>:<addr?>` (§4.8, §6).
pub fn wallet_add() -> String {
    format!("{WALLET_PREFIX}add")
}

/// `link:<approve|reject|report>:<requestId>` (§4.8, §6).
pub fn link_approve(request_id: &str) -> String {
    format!("{LINK_PREFIX}approve:{request_id}")
}

pub fn link_reject(request_id: &str) -> String {
    format!("{LINK_PREFIX}reject:{request_id}")
}

pub fn link_report(request_id: &str) -> String {
    format!("{LINK_PREFIX}report:{request_id}")
}

/// Build `link:magic:<requestId>` (§4.8): the acknowledgement button shown
/// alongside the magic-amount deposit instructions.
pub fn link_magic(request_id: &str) -> String {
    format!("{LINK_PREFIX}magic:{request_id}")
}

/// Parse `<approve|reject|report|magic>:<requestId>` (the `link:` prefix
/// already stripped by the dispatcher).
pub fn parse_link_action(remainder: &str) -> Option<(&str, &str)> {
    remainder.split_once(':')
}

/// Settings-menu callback-data, built from display names with spaces
/// replaced by underscores (§4.3 "Callback-data keys use
/// display-name-with-underscores"). `tool_params`/`edit_param` use a `__`
/// separator between the slugged display name and the trailing token, since
/// both may themselves contain single underscores.
pub fn slug_display_name(display_name: &str) -> String {
    display_name.replace(' ', "_")
}

pub fn set_main() -> String {
    format!("{SET_PREFIX}main")
}

pub fn set_close() -> String {
    format!("{SET_PREFIX}close")
}

pub fn set_all_tools(page: u32) -> String {
    format!("{SET_PREFIX}all_tools_{page}")
}

pub fn set_tool_params(display_name: &str) -> String {
    format!("{SET_PREFIX}tool_params_{}", slug_display_name(display_name))
}

pub fn set_edit_param(display_name: &str, param_name: &str) -> String {
    format!(
        "{SET_PREFIX}edit_param_{}__{}",
        slug_display_name(display_name),
        param_name
    )
}

/// Parsed shape of a `set_*` callback (remainder with `set_` already
/// stripped by the dispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    Main,
    Close,
    AllTools { page: u32 },
    ToolParams { display_name: String },
    EditParam { display_name: String, param_name: String },
}

pub fn parse_settings_action(remainder: &str) -> Option<SettingsAction> {
    if remainder == "main" {
        return Some(SettingsAction::Main);
    }
    if remainder == "close" {
        return Some(SettingsAction::Close);
    }
    if let Some(page) = remainder.strip_prefix("all_tools_") {
        return Some(SettingsAction::AllTools {
            page: page.parse().ok()?,
        });
    }
    if let Some(slug) = remainder.strip_prefix("tool_params_") {
        return Some(SettingsAction::ToolParams {
            display_name: slug.replace('_', " "),
        });
    }
    if let Some(rest) = remainder.strip_prefix("edit_param_") {
        let (tool_slug, param_name) = rest.split_once("__")?;
        return Some(SettingsAction::EditParam {
            display_name: tool_slug.replace('_', " "),
            param_name: param_name.to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweak_gen_round_trips() {
        let data = tweak_gen("g1");
        assert_eq!(data, "tweak_gen:g1");
        assert_eq!(data.strip_prefix(TWEAK_GEN_PREFIX), Some("g1"));
    }

    #[test]
    fn parse_tweak_param_edit_splits_token_and_param() {
        let remainder = "abcd1234_input_steps";
        assert_eq!(
            parse_tweak_param_edit_remainder(remainder),
            Some(("abcd1234", "input_steps"))
        );
    }

    #[test]
    fn parse_rerun_remainder_defaults_count_to_zero() {
        assert_eq!(parse_rerun_remainder("g1"), ("g1", 0));
        assert_eq!(parse_rerun_remainder("g1:3"), ("g1", 3));
    }

    #[test]
    fn every_generated_callback_is_within_limit() {
        let long_id = "g".repeat(40);
        assert!(tweak_gen(&long_id).len() <= 64);
        assert!(rerun_gen(&long_id, 99).len() <= 64);
    }

    #[test]
    fn settings_action_round_trips_tool_params() {
        let data = set_tool_params("Quick Image");
        let remainder = data.strip_prefix(SET_PREFIX).unwrap();
        assert_eq!(
            parse_settings_action(remainder),
            Some(SettingsAction::ToolParams {
                display_name: "Quick Image".to_string()
            })
        );
    }

    #[test]
    fn settings_action_round_trips_edit_param() {
        let data = set_edit_param("Quick Image", "input_steps");
        let remainder = data.strip_prefix(SET_PREFIX).unwrap();
        assert_eq!(
            parse_settings_action(remainder),
            Some(SettingsAction::EditParam {
                display_name: "Quick Image".to_string(),
                param_name: "input_steps".to_string()
            })
        );
    }

    #[test]
    fn settings_action_parses_main_and_close() {
        assert_eq!(parse_settings_action("main"), Some(SettingsAction::Main));
        assert_eq!(parse_settings_action("close"), Some(SettingsAction::Close));
    }

    #[test]
    fn lora_category_round_trips() {
        let data = lora_category("memes", "SDXL", 2);
        let remainder = data.strip_prefix(LORA_PREFIX).unwrap();
        assert_eq!(
            parse_lora_action(remainder),
            Some(LoraAction::Category {
                category: "memes".to_string(),
                checkpoint: "SDXL".to_string(),
                page: 2,
            })
        );
    }

    #[test]
    fn lora_favorite_round_trips() {
        let data = lora_favorite("my-lora", true);
        let remainder = data.strip_prefix(LORA_PREFIX).unwrap();
        assert_eq!(
            parse_lora_action(remainder),
            Some(LoraAction::Favorite {
                slug: "my-lora".to_string(),
                on: true,
            })
        );
    }

    #[test]
    fn link_action_round_trips() {
        let data = link_approve("req1");
        let remainder = data.strip_prefix(LINK_PREFIX).unwrap();
        assert_eq!(parse_link_action(remainder), Some(("approve", "req1")));
    }

    #[test]
    fn link_magic_round_trips() {
        let data = link_magic("req1");
        let remainder = data.strip_prefix(LINK_PREFIX).unwrap();
        assert_eq!(parse_link_action(remainder), Some(("magic", "req1")));
    }
}
