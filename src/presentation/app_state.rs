// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::infrastructure::config::DashboardSettings;

pub struct AppState {
    pub dashboard: DashboardService,
    /// Title, logo and grid options echoed to the front end
    pub info: DashboardSettings,
}
