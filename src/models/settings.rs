use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    Activity,
    Subs,
    Ratings,
    Settings,
    Author,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 5] = [
        DashboardTab::Activity,
        DashboardTab::Subs,
        DashboardTab::Ratings,
        DashboardTab::Settings,
        DashboardTab::Author,
    ];

    pub fn id(self) -> &'static str {
        match self {
            DashboardTab::Activity => "activity",
            DashboardTab::Subs => "subs",
            DashboardTab::Ratings => "ratings",
            DashboardTab::Settings => "settings",
            DashboardTab::Author => "author",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DashboardTab::Activity => "Activity Feed",
            DashboardTab::Subs => "Subscriptions",
            DashboardTab::Ratings => "Ratings",
            DashboardTab::Settings => "Settings",
            DashboardTab::Author => "Statistics",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.id() == id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    FirstName,
    LastName,
    DisplayName,
    UserEmail,
    UserUrl,
    Description,
    ContactMethods,
    Password,
}

impl ProfileField {
    pub const ALL: [ProfileField; 8] = [
        ProfileField::FirstName,
        ProfileField::LastName,
        ProfileField::DisplayName,
        ProfileField::UserEmail,
        ProfileField::UserUrl,
        ProfileField::Description,
        ProfileField::ContactMethods,
        ProfileField::Password,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ProfileField::FirstName => "first_name",
            ProfileField::LastName => "last_name",
            ProfileField::DisplayName => "display_name",
            ProfileField::UserEmail => "user_email",
            ProfileField::UserUrl => "user_url",
            ProfileField::Description => "description",
            ProfileField::ContactMethods => "contact_methods",
            ProfileField::Password => "password",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileField::FirstName => "First Name",
            ProfileField::LastName => "Last Name",
            ProfileField::DisplayName => "Display Name",
            ProfileField::UserEmail => "Email Address",
            ProfileField::UserUrl => "Website URL",
            ProfileField::Description => "Bio / Description",
            ProfileField::ContactMethods => "Social & Contact Links",
            ProfileField::Password => "Password Change",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.id() == id)
    }
}

pub const DEFAULT_PRIMARY_COLOR: &str = "#6366f1";
pub const DEFAULT_BTN_TEXT_COLOR: &str = "#ffffff";
pub const DEFAULT_STATS_BOX_BG: &str = "#6366f1";
pub const DEFAULT_BORDER_RADIUS: u32 = 18;
pub const DEFAULT_PER_PAGE: usize = 6;

/// Admin-controlled look and feel of the dashboard. Loaded once at startup and
/// replaced wholesale when an administrator saves new settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSettings {
    pub primary_color: String,
    pub btn_text_color: String,
    pub stats_box_bg: String,
    pub border_radius: u32,
    pub per_page: usize,
    pub tabs_enabled: Vec<DashboardTab>,
    pub fields_enabled: Vec<ProfileField>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            btn_text_color: DEFAULT_BTN_TEXT_COLOR.to_string(),
            stats_box_bg: DEFAULT_STATS_BOX_BG.to_string(),
            border_radius: DEFAULT_BORDER_RADIUS,
            per_page: DEFAULT_PER_PAGE,
            tabs_enabled: DashboardTab::ALL.to_vec(),
            fields_enabled: ProfileField::ALL.to_vec(),
        }
    }
}

impl DashboardSettings {
    pub fn tab_enabled(&self, tab: DashboardTab) -> bool {
        self.tabs_enabled.contains(&tab)
    }

    pub fn field_enabled(&self, field: ProfileField) -> bool {
        self.fields_enabled.contains(&field)
    }

    pub fn page_size(&self) -> usize {
        self.per_page.max(1)
    }
}

/// CSS custom property values derived from the settings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Theme {
    pub primary: String,
    pub btn_text: String,
    pub stats_bg: String,
    pub radius: String,
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub label: &'static str,
}
