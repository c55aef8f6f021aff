//! Dashboard navigation.

use serde::Serialize;

/// Content sections under the home path: slug and label.
pub const SECTIONS: [(&str, &str); 5] = [
    ("about", "About"),
    ("skills", "Skills"),
    ("projects", "Projects"),
    ("blogs", "Blogs"),
    ("messages", "Messages"),
];

/// A navigation group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_label: String,
    pub menus: Vec<Menu>,
}

/// A navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub href: String,
    pub label: String,
    pub active: bool,
}

/// Label of a known section.
pub fn section(slug: &str) -> Option<&'static str> {
    SECTIONS
        .iter()
        .find(|(known, _)| *known == slug)
        .map(|(_, label)| *label)
}

/// Menu groups for a dashboard rooted at `home`, marking the entry for
/// `current` active.
pub fn groups(home: &str, current: &str) -> Vec<Group> {
    let entry = |href: String, label: &str| Menu {
        active: href == current,
        href,
        label: label.to_owned(),
    };

    let home = home.trim_end_matches('/');
    vec![
        Group {
            group_label: String::new(),
            menus: vec![entry(home.to_owned(), "Dashboard")],
        },
        Group {
            group_label: String::new(),
            menus: SECTIONS
                .iter()
                .map(|(slug, label)| entry(format!("{home}/{slug}"), label))
                .collect(),
        },
    ]
}
