//! Base viewer shared by every resource kind.

use tracing::debug;

use super::actions::{Action, BoundAction, KeyActions, KeyBinding};
use super::{ResourceViewer, ViewContext, ViewError, ViewOutcome};
use crate::config::Config;
use crate::export;
use crate::model::{AGE_COL, NAME_COL, NAMESPACE_COL};
use crate::source::{POD_KIND, renderer_for};
use crate::table::TableController;

pub struct Browser {
    table: TableController,
    actions: KeyActions,
}

impl Browser {
    pub fn new(kind: &str, config: &Config) -> Self {
        let mut table = TableController::new(kind);
        if let Some(r) = renderer_for(kind) {
            table.set_colorer(r.colorer());
        }
        table.set_view_columns(config.columns(kind).to_vec());

        let mut b = Self {
            table,
            actions: KeyActions::new(),
        };
        b.bind_keys();
        b
    }

    fn bind_keys(&mut self) {
        let a = &mut self.actions;
        a.add(KeyBinding::char('/'), BoundAction::new("Filter", Action::Filter, true));
        a.add(KeyBinding::ctrl('w'), BoundAction::new("Toggle Wide", Action::ToggleWide, true));
        a.add(KeyBinding::ctrl('z'), BoundAction::new("Toggle Faults", Action::ToggleToast, true));
        a.add(KeyBinding::char(' '), BoundAction::new("Mark", Action::ToggleMark, true));
        a.add(KeyBinding::ctrl('\\'), BoundAction::new("Mark Clear", Action::ClearMarks, false));
        a.add(KeyBinding::ctrl('s'), BoundAction::new("Save", Action::Dump, false));
        a.add(KeyBinding::char('f'), BoundAction::new("Port-Forwards", Action::ShowTunnels, true));
        a.add(KeyBinding::shift('i'), BoundAction::new("Sort Invert", Action::InvertSort, false));
        a.add(KeyBinding::shift('n'), sort_action("Sort Name", NAME_COL, true));
        a.add(KeyBinding::shift('a'), sort_action("Sort Age", AGE_COL, true));

        if self.table.kind() == POD_KIND {
            a.add(KeyBinding::shift('r'), sort_action("Sort Restarts", "RESTARTS", false));
            a.add(KeyBinding::shift('s'), sort_action("Sort Status", "STATUS", true));
            a.add(KeyBinding::shift('c'), sort_action("Sort CPU", "CPU", false));
            a.add(KeyBinding::shift('m'), sort_action("Sort MEM", "MEM", false));
        }
        self.refresh_actions();
    }
}

fn sort_action(description: &str, col: &str, asc: bool) -> BoundAction {
    BoundAction::new(
        description,
        Action::SortColumn {
            name: col.to_string(),
            asc,
        },
        false,
    )
}

impl ResourceViewer for Browser {
    fn table(&self) -> &TableController {
        &self.table
    }

    fn table_mut(&mut self) -> &mut TableController {
        &mut self.table
    }

    fn actions(&self) -> &KeyActions {
        &self.actions
    }

    fn actions_mut(&mut self) -> &mut KeyActions {
        &mut self.actions
    }

    fn refresh_actions(&mut self) {
        let key = KeyBinding::shift('p');
        if self.table.cluster_wide() {
            self.actions
                .add(key, sort_action("Sort Namespace", NAMESPACE_COL, true));
        } else {
            self.actions.delete(&key);
        }
    }

    fn handle(
        &mut self,
        action: &Action,
        ctx: &ViewContext<'_>,
    ) -> Result<ViewOutcome, ViewError> {
        debug!(kind = %self.table.kind(), ?action, "view action");
        match action {
            Action::SortColumn { name, asc } => self.table.sort_col_cmd(name, *asc),
            Action::InvertSort => self.table.invert_sort(),
            Action::ToggleWide => self.table.toggle_wide(),
            Action::ToggleToast => self.table.toggle_toast(),
            Action::ToggleMark => {
                self.table.toggle_mark();
                self.table.select_down();
            }
            Action::ClearMarks => self.table.clear_marks(),
            Action::Filter => {
                self.table.activate_filter();
                return Ok(ViewOutcome::StartFilter);
            }
            Action::Dump => {
                let path =
                    export::dump(&self.table, &ctx.config.dump_dir).map_err(ViewError::Export)?;
                return Ok(ViewOutcome::Flash(format!(
                    "File {} saved successfully!",
                    path.display()
                )));
            }
            Action::ShowTunnels => return Ok(ViewOutcome::ShowTunnels),
            Action::GotoKind(kind) => return Ok(ViewOutcome::Goto(kind.clone())),
            Action::PortForward => {
                return Err(ViewError::NotForwardable(self.table.kind().to_string()));
            }
        }
        Ok(ViewOutcome::Done)
    }
}
