//! Column editor: changes the sort order of the quotes table. When activated
//! it highlights the current sort column in the header, then waits for the
//! arrow keys (choose another column), Enter (sort by it, or reverse the
//! order if it is already the sort column), or Esc (exit).

use crossterm::event::{KeyCode, KeyEvent};
use log::{info, warn};
use quote_common::Result;
use quote_common::column::Column;

use crate::dashboard::Dashboard;
use crate::surface::Surface;

pub struct ColumnEditor;

impl ColumnEditor {
    /// Highlights the current sort column.
    pub fn new<S: Surface>(dashboard: &mut Dashboard<S>) -> Result<Self> {
        dashboard.profile.selected_column = Some(dashboard.profile.sort_column);
        info!("Column editor opened on {}", dashboard.profile.sort_column);
        dashboard.draw_header()?;
        Ok(Self)
    }

    /// Handles one key. Returns true when the user pressed Esc. Every key,
    /// handled or not, ends with a header redraw.
    pub fn handle<S: Surface>(&mut self, key: KeyEvent, dashboard: &mut Dashboard<S>) -> Result<bool> {
        let done = match key.code {
            KeyCode::Esc => {
                dashboard.profile.selected_column = None;
                info!("Column editor closed");
                true
            }
            KeyCode::Enter => {
                self.execute(dashboard)?;
                false
            }
            KeyCode::Left => {
                self.select(dashboard, |index| index.checked_sub(1).unwrap_or(Column::TOTAL - 1));
                false
            }
            KeyCode::Right => {
                self.select(dashboard, |index| (index + 1) % Column::TOTAL);
                false
            }
            _ => false,
        };
        dashboard.draw_header()?;
        Ok(done)
    }

    fn select<S: Surface>(&self, dashboard: &mut Dashboard<S>, step: impl Fn(usize) -> usize) {
        let current = dashboard
            .profile
            .selected_column
            .unwrap_or(dashboard.profile.sort_column);
        dashboard.profile.selected_column = Column::from_index(step(current.index()));
    }

    fn execute<S: Surface>(&self, dashboard: &mut Dashboard<S>) -> Result<()> {
        match dashboard.profile.reorder() {
            Ok(()) => {
                info!(
                    "Sorting by {} {}",
                    dashboard.profile.sort_column,
                    if dashboard.profile.ascending { "ascending" } else { "descending" }
                );
                dashboard.draw_quotes()
            }
            Err(e) => {
                warn!("Reorder failed: {}", e);
                Ok(())
            }
        }
    }
}
