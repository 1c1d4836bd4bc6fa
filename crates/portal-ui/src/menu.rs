//! Mobile navigation menu.

/// Where a click landed, relative to the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Toggle,
    Menu,
    Outside,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Any click outside both the menu and its toggle closes it
    pub fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Toggle => self.toggle(),
            ClickTarget::Menu => {}
            ClickTarget::Outside => self.open = false,
        }
    }

    /// CSS class for the menu and the toggle button
    pub fn class(&self) -> &'static str {
        if self.open {
            "active"
        } else {
            ""
        }
    }
}
