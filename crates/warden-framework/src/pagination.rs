//! Paginated module menus.
//!
//! [`page`] is the pure windowing function; [`module_menu`] turns one page of
//! modules into an inline keyboard for either the help or the settings menu.

use warden_core::{ChatId, InlineButton, InlineKeyboard};

use crate::callback::CallbackData;
use crate::module::{Capability, ModuleDescriptor, ModuleRegistry};

/// One window over a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub index: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Number of pages needed for `len` items.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Returns page `index` of `items`.
///
/// Callers validate `index` against [`page_count`] first; an out-of-range
/// index (or a zero page size) yields an empty page with no navigation.
pub fn page<T>(index: usize, items: &[T], page_size: usize) -> Page<'_, T> {
    let pages = page_count(items.len(), page_size);
    if index >= pages {
        return Page {
            items: &[],
            index,
            has_prev: false,
            has_next: false,
        };
    }

    let start = index * page_size;
    let end = (start + page_size).min(items.len());
    Page {
        items: &items[start..end],
        index,
        has_prev: index > 0,
        has_next: index + 1 < pages,
    }
}

/// Which menu a keyboard belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Help,
    /// Settings of the given chat.
    Settings(ChatId),
}

impl MenuKind {
    /// Capability a module needs to appear in this menu.
    pub fn capability(&self) -> Capability {
        match self {
            Self::Help => Capability::Help,
            Self::Settings(_) => Capability::ChatSettings,
        }
    }

    pub fn open(&self, module: &ModuleDescriptor) -> CallbackData {
        match *self {
            Self::Help => CallbackData::HelpModule(module.key()),
            Self::Settings(chat) => CallbackData::SettingsModule {
                chat,
                module: module.key(),
            },
        }
    }

    pub fn prev(&self, page: usize) -> CallbackData {
        match *self {
            Self::Help => CallbackData::HelpPrev(page),
            Self::Settings(chat) => CallbackData::SettingsPrev { chat, page },
        }
    }

    pub fn next(&self, page: usize) -> CallbackData {
        match *self {
            Self::Help => CallbackData::HelpNext(page),
            Self::Settings(chat) => CallbackData::SettingsNext { chat, page },
        }
    }

    pub fn back(&self) -> CallbackData {
        match *self {
            Self::Help => CallbackData::HelpBack,
            Self::Settings(chat) => CallbackData::SettingsBack(chat),
        }
    }

    /// A keyboard holding only the "Back" button.
    pub fn back_keyboard(&self) -> InlineKeyboard {
        InlineKeyboard::new().row(vec![InlineButton::callback(
            "Back",
            self.back().to_string(),
        )])
    }
}

/// Menu geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuLayout {
    /// Modules per page.
    pub page_size: usize,
    /// Buttons per row.
    pub columns: usize,
}

impl Default for MenuLayout {
    fn default() -> Self {
        Self {
            page_size: 10,
            columns: 2,
        }
    }
}

/// Builds the keyboard for page `index` of `modules`.
///
/// Module buttons fill rows of `layout.columns`; a navigation row with `<`
/// and `>` follows when neighbouring pages exist. Navigation buttons carry
/// the current index. Returns `None` when `index` is out of range.
pub fn module_menu(
    kind: MenuKind,
    index: usize,
    modules: &[&ModuleDescriptor],
    layout: MenuLayout,
) -> Option<InlineKeyboard> {
    if index >= page_count(modules.len(), layout.page_size) {
        return None;
    }
    let view = page(index, modules, layout.page_size);

    let buttons: Vec<InlineButton> = view
        .items
        .iter()
        .map(|m| InlineButton::callback(m.name(), kind.open(m).to_string()))
        .collect();

    let mut keyboard = InlineKeyboard::new();
    for row in buttons.chunks(layout.columns.max(1)) {
        keyboard.push_row(row.to_vec());
    }

    let mut nav = Vec::new();
    if view.has_prev {
        nav.push(InlineButton::callback("<", kind.prev(index).to_string()));
    }
    if view.has_next {
        nav.push(InlineButton::callback(">", kind.next(index).to_string()));
    }
    if !nav.is_empty() {
        keyboard.push_row(nav);
    }

    Some(keyboard)
}

/// [`module_menu`] over every registered module eligible for `kind`.
pub fn registry_menu(
    kind: MenuKind,
    index: usize,
    registry: &ModuleRegistry,
    layout: MenuLayout,
) -> Option<InlineKeyboard> {
    module_menu(kind, index, &registry.all_with(kind.capability()), layout)
}
