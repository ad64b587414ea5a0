//! Trip purpose catalog offered by the planning form

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Purpose {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurposeGroup {
    pub label: &'static str,
    pub options: &'static [Purpose],
}

const fn purpose(label: &'static str, value: &'static str) -> Purpose {
    Purpose { label, value }
}

pub static PURPOSE_GROUPS: &[PurposeGroup] = &[
    PurposeGroup {
        label: "🧳 Leisure & Recreation",
        options: &[
            purpose("Vacation", "vacation"),
            purpose("Beach Trip", "beach trip"),
            purpose("Road Trip", "road trip"),
            purpose("Camping", "camping"),
            purpose("Hiking", "hiking"),
            purpose("Backpacking", "backpacking"),
            purpose("Sightseeing", "sightseeing"),
            purpose("Festival or Concert", "festival or concert"),
            purpose("Spa Getaway", "spa getaway"),
        ],
    },
    PurposeGroup {
        label: "💼 Work & Study",
        options: &[
            purpose("Work Travel", "work travel"),
            purpose("Remote Work", "remote work"),
            purpose("Conference", "conference"),
            purpose("Business Meeting", "business meeting"),
            purpose("Study Abroad", "study abroad"),
            purpose("Research Expedition", "research expedition"),
        ],
    },
    PurposeGroup {
        label: "🎉 Events & Occasions",
        options: &[
            purpose("Wedding", "wedding"),
            purpose("Honeymoon", "honeymoon"),
            purpose("Birthday Celebration", "birthday celebration"),
            purpose("Family Reunion", "family reunion"),
            purpose("Bachelorette / Bachelor Party", "bachelorette party"),
        ],
    },
    PurposeGroup {
        label: "🧘 Personal & Purpose-Driven",
        options: &[
            purpose("Wellness Retreat", "wellness retreat"),
            purpose("Volunteering", "volunteering"),
            purpose("Visiting Family", "visiting family"),
            purpose("Relocation / Moving", "relocation"),
            purpose("Photography Trip", "photography trip"),
            purpose("Food & Culinary Tour", "culinary tour"),
        ],
    },
];

/// Catalog entry for a purpose value (case-insensitive)
#[must_use]
pub fn find(value: &str) -> Option<&'static Purpose> {
    let value = value.trim();
    PURPOSE_GROUPS
        .iter()
        .flat_map(|group| group.options.iter())
        .find(|purpose| purpose.value.eq_ignore_ascii_case(value))
}

/// Display label for a purpose; free-text purposes are shown as typed
#[must_use]
pub fn label_for(value: &str) -> &str {
    find(value).map_or(value, |purpose| purpose.label)
}
