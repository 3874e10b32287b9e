//! Permission mask resolution.
//!
//! Masks are 64-bit: the enumerate-permissions bit sits at position 62 and
//! the full-mask sentinel is `0x7FFF_FFFF_FFFF_FFFF`, both beyond what a
//! double-precision float can represent exactly, so all arithmetic here is
//! integer `u64`.

/// Named permission bits.
pub mod mask {
    pub const EMPTY_MASK: u64 = 0x0000_0000_0000_0000;
    pub const FULL_MASK: u64 = 0x7FFF_FFFF_FFFF_FFFF;

    // List and document permissions
    pub const VIEW_LIST_ITEMS: u64 = 0x0000_0000_0000_0001;
    pub const ADD_LIST_ITEMS: u64 = 0x0000_0000_0000_0002;
    pub const EDIT_LIST_ITEMS: u64 = 0x0000_0000_0000_0004;
    pub const DELETE_LIST_ITEMS: u64 = 0x0000_0000_0000_0008;
    pub const APPROVE_ITEMS: u64 = 0x0000_0000_0000_0010;
    pub const OPEN_ITEMS: u64 = 0x0000_0000_0000_0020;
    pub const VIEW_VERSIONS: u64 = 0x0000_0000_0000_0040;
    pub const DELETE_VERSIONS: u64 = 0x0000_0000_0000_0080;
    pub const CANCEL_CHECKOUT: u64 = 0x0000_0000_0000_0100;
    pub const MANAGE_PERSONAL_VIEWS: u64 = 0x0000_0000_0000_0200;
    pub const MANAGE_LISTS: u64 = 0x0000_0000_0000_0800;
    pub const VIEW_FORM_PAGES: u64 = 0x0000_0000_0000_1000;

    // Web level permissions
    pub const OPEN: u64 = 0x0000_0000_0001_0000;
    pub const VIEW_PAGES: u64 = 0x0000_0000_0002_0000;
    pub const ADD_AND_CUSTOMIZE_PAGES: u64 = 0x0000_0000_0004_0000;
    pub const APPLY_THEME_AND_BORDER: u64 = 0x0000_0000_0008_0000;
    pub const APPLY_STYLE_SHEETS: u64 = 0x0000_0000_0010_0000;
    pub const VIEW_USAGE_DATA: u64 = 0x0000_0000_0020_0000;
    pub const CREATE_SSC_SITE: u64 = 0x0000_0000_0040_0000;
    pub const MANAGE_SUBWEBS: u64 = 0x0000_0000_0080_0000;
    pub const CREATE_GROUPS: u64 = 0x0000_0000_0100_0000;
    pub const MANAGE_PERMISSIONS: u64 = 0x0000_0000_0200_0000;
    pub const BROWSE_DIRECTORIES: u64 = 0x0000_0000_0400_0000;
    pub const BROWSE_USER_INFO: u64 = 0x0000_0000_0800_0000;
    pub const ADD_DEL_PRIVATE_WEB_PARTS: u64 = 0x0000_0000_1000_0000;
    pub const UPDATE_PERSONAL_WEB_PARTS: u64 = 0x0000_0000_2000_0000;
    pub const MANAGE_WEB: u64 = 0x0000_0000_4000_0000;
    pub const USE_CLIENT_INTEGRATION: u64 = 0x0000_0010_0000_0000;
    pub const USE_REMOTE_APIS: u64 = 0x0000_0020_0000_0000;
    pub const MANAGE_ALERTS: u64 = 0x0000_0040_0000_0000;
    pub const CREATE_ALERTS: u64 = 0x0000_0080_0000_0000;
    pub const EDIT_MY_USER_INFO: u64 = 0x0000_0100_0000_0000;

    // Special permissions
    pub const ENUMERATE_PERMISSIONS: u64 = 0x4000_0000_0000_0000;
}

/// Per-permission view of a raw mask, resolved once per list from the first
/// fetched record and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserPermissions {
    pub view_list_items: bool,
    pub add_list_items: bool,
    pub edit_list_items: bool,
    pub delete_list_items: bool,
    pub approve_items: bool,
    pub open_items: bool,
    pub view_versions: bool,
    pub delete_versions: bool,
    pub cancel_checkout: bool,
    pub manage_personal_views: bool,
    pub manage_lists: bool,
    pub view_form_pages: bool,
    pub open: bool,
    pub view_pages: bool,
    pub add_and_customize_pages: bool,
    pub apply_theme_and_border: bool,
    pub apply_style_sheets: bool,
    pub view_usage_data: bool,
    pub create_ssc_site: bool,
    pub manage_subwebs: bool,
    pub create_groups: bool,
    pub manage_permissions: bool,
    pub browse_directories: bool,
    pub browse_user_info: bool,
    pub add_del_private_web_parts: bool,
    pub update_personal_web_parts: bool,
    pub manage_web: bool,
    pub use_client_integration: bool,
    pub use_remote_apis: bool,
    pub manage_alerts: bool,
    pub create_alerts: bool,
    pub edit_my_user_info: bool,
    pub enumerate_permissions: bool,
    pub full_mask: bool,
}

impl UserPermissions {
    fn all_granted() -> Self {
        Self {
            view_list_items: true,
            add_list_items: true,
            edit_list_items: true,
            delete_list_items: true,
            approve_items: true,
            open_items: true,
            view_versions: true,
            delete_versions: true,
            cancel_checkout: true,
            manage_personal_views: true,
            manage_lists: true,
            view_form_pages: true,
            open: true,
            view_pages: true,
            add_and_customize_pages: true,
            apply_theme_and_border: true,
            apply_style_sheets: true,
            view_usage_data: true,
            create_ssc_site: true,
            manage_subwebs: true,
            create_groups: true,
            manage_permissions: true,
            browse_directories: true,
            browse_user_info: true,
            add_del_private_web_parts: true,
            update_personal_web_parts: true,
            manage_web: true,
            use_client_integration: true,
            use_remote_apis: true,
            manage_alerts: true,
            create_alerts: true,
            edit_my_user_info: true,
            enumerate_permissions: true,
            full_mask: true,
        }
    }
}

/// Resolve a raw permission mask into per-permission booleans.
///
/// The full-mask sentinel only resolves correctly when compared for exact
/// equality (intersecting against it is unreliable at the boundary), so it is
/// matched first and grants everything.
pub fn resolve(permissions_mask: u64) -> UserPermissions {
    use mask::*;

    if permissions_mask == FULL_MASK {
        return UserPermissions::all_granted();
    }

    let bit = |m: u64| (m & permissions_mask) > 0;

    UserPermissions {
        view_list_items: bit(VIEW_LIST_ITEMS),
        add_list_items: bit(ADD_LIST_ITEMS),
        edit_list_items: bit(EDIT_LIST_ITEMS),
        delete_list_items: bit(DELETE_LIST_ITEMS),
        approve_items: bit(APPROVE_ITEMS),
        open_items: bit(OPEN_ITEMS),
        view_versions: bit(VIEW_VERSIONS),
        delete_versions: bit(DELETE_VERSIONS),
        cancel_checkout: bit(CANCEL_CHECKOUT),
        manage_personal_views: bit(MANAGE_PERSONAL_VIEWS),
        manage_lists: bit(MANAGE_LISTS),
        view_form_pages: bit(VIEW_FORM_PAGES),
        open: bit(OPEN),
        view_pages: bit(VIEW_PAGES),
        add_and_customize_pages: bit(ADD_AND_CUSTOMIZE_PAGES),
        apply_theme_and_border: bit(APPLY_THEME_AND_BORDER),
        apply_style_sheets: bit(APPLY_STYLE_SHEETS),
        view_usage_data: bit(VIEW_USAGE_DATA),
        create_ssc_site: bit(CREATE_SSC_SITE),
        manage_subwebs: bit(MANAGE_SUBWEBS),
        create_groups: bit(CREATE_GROUPS),
        manage_permissions: bit(MANAGE_PERMISSIONS),
        browse_directories: bit(BROWSE_DIRECTORIES),
        browse_user_info: bit(BROWSE_USER_INFO),
        add_del_private_web_parts: bit(ADD_DEL_PRIVATE_WEB_PARTS),
        update_personal_web_parts: bit(UPDATE_PERSONAL_WEB_PARTS),
        manage_web: bit(MANAGE_WEB),
        use_client_integration: bit(USE_CLIENT_INTEGRATION),
        use_remote_apis: bit(USE_REMOTE_APIS),
        manage_alerts: bit(MANAGE_ALERTS),
        create_alerts: bit(CREATE_ALERTS),
        edit_my_user_info: bit(EDIT_MY_USER_INFO),
        enumerate_permissions: bit(ENUMERATE_PERMISSIONS),
        full_mask: false,
    }
}

/// Convert an effective-perm-mask *name* (as returned on the list element of
/// an incremental response) into its mask value. Returns `None` for unknown
/// names.
pub fn mask_for_name(name: &str) -> Option<u64> {
    use mask::*;

    let value = match name {
        "EmptyMask" => EMPTY_MASK,
        "FullMask" => FULL_MASK,
        "ViewListItems" => VIEW_LIST_ITEMS,
        "AddListItems" => ADD_LIST_ITEMS,
        "EditListItems" => EDIT_LIST_ITEMS,
        "DeleteListItems" => DELETE_LIST_ITEMS,
        "ApproveItems" => APPROVE_ITEMS,
        "OpenItems" => OPEN_ITEMS,
        "ViewVersions" => VIEW_VERSIONS,
        "DeleteVersions" => DELETE_VERSIONS,
        "CancelCheckout" => CANCEL_CHECKOUT,
        "ManagePersonalViews" => MANAGE_PERSONAL_VIEWS,
        "ManageLists" => MANAGE_LISTS,
        "ViewFormPages" => VIEW_FORM_PAGES,
        "Open" => OPEN,
        "ViewPages" => VIEW_PAGES,
        "AddAndCustomizePages" => ADD_AND_CUSTOMIZE_PAGES,
        "ApplyThemeAndBorder" => APPLY_THEME_AND_BORDER,
        "ApplyStyleSheets" => APPLY_STYLE_SHEETS,
        "ViewUsageData" => VIEW_USAGE_DATA,
        "CreateSSCSite" => CREATE_SSC_SITE,
        "ManageSubwebs" => MANAGE_SUBWEBS,
        "CreateGroups" => CREATE_GROUPS,
        "ManagePermissions" => MANAGE_PERMISSIONS,
        "BrowseDirectories" => BROWSE_DIRECTORIES,
        "BrowseUserInfo" => BROWSE_USER_INFO,
        "AddDelPrivateWebParts" => ADD_DEL_PRIVATE_WEB_PARTS,
        "UpdatePersonalWebParts" => UPDATE_PERSONAL_WEB_PARTS,
        "ManageWeb" => MANAGE_WEB,
        "UseClientIntegration" => USE_CLIENT_INTEGRATION,
        "UseRemoteAPIs" => USE_REMOTE_APIS,
        "ManageAlerts" => MANAGE_ALERTS,
        "CreateAlerts" => CREATE_ALERTS,
        "EditMyUserInfo" => EDIT_MY_USER_INFO,
        "EnumeratePermissions" => ENUMERATE_PERMISSIONS,
        _ => return None,
    };
    Some(value)
}

/// Parse a raw mask attribute — either a `0x`-prefixed hex string or a
/// decimal string.
pub fn parse_mask(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        raw.parse::<u64>().ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
