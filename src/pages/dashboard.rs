use std::sync::Arc;

use super::{Emptiness, PageController, PageState};
use crate::core_state::{CoreError, CoreState};
use crate::dashboard::{load_dashboard, DashboardData};

impl Emptiness for DashboardData {
    // The dashboard renders its cards even with zero counts.
    fn is_empty_view(&self) -> bool {
        false
    }
}

pub struct DashboardPage {
    core: Arc<CoreState>,
    controller: PageController<DashboardData>,
}

impl DashboardPage {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            controller: PageController::new("dashboard data"),
        }
    }

    pub fn state(&self) -> PageState<DashboardData> {
        self.controller.state()
    }

    pub async fn mount(&self) -> bool {
        self.refresh().await
    }

    pub async fn refresh(&self) -> bool {
        let core = &self.core;
        self.controller
            .run(core.toasts(), async {
                load_dashboard(&core.appointments, &core.patients, &core.doctors, &core.bills)
                    .await
                    .map_err(CoreError::from)
            })
            .await
    }
}
