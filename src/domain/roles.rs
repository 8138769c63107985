use serde::{Deserialize, Serialize};

pub const CHAPTER_PREFIXES: [&str; 2] = ["College: ", "Corporate: "];

pub const GENDER_ROLES: [&str; 3] = ["M", "F", "NB"];

pub const COUNTRY_ROLES: [&str; 7] = [
    "India",
    "Asia (Outside India)",
    "Europe",
    "Africa",
    "North America",
    "South America",
    "Australia",
];

pub const CITY_ROLES: [&str; 7] = ["Delhi", "Bangalore", "Mumbai", "Pune", "Hyderabad", "Chennai", "Kochi"];

pub const EXPERIENCE_ROLES: [&str; 8] = [
    "Tech Freshman",
    "Tech Sophomore",
    "Tech Junior",
    "Tech Senior",
    "Junior Developer",
    "Senior Developer",
    "Super Senior Developer",
    "Champion Developer",
];

/// What a member's role labels say about them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Chapter names with the "College: " / "Corporate: " prefix removed, in label order
    pub chapter_roles: Vec<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub experience: Option<String>,
}

impl Classification {
    /// The chapter stored on the contributor row
    pub fn primary_chapter(&self) -> Option<&str> {
        self.chapter_roles.first().map(String::as_str)
    }
}

fn chapter_name(label: &str) -> Option<&str> {
    CHAPTER_PREFIXES.iter().find_map(|prefix| label.strip_prefix(prefix))
}

fn first_in(labels: &[&str], vocabulary: &[&str]) -> Option<String> {
    labels
        .iter()
        .copied()
        .find(|label| vocabulary.contains(label))
        .map(str::to_string)
}

/// Partition role labels into chapter, gender, country, city and experience.
/// Matching is exact; for the single-valued categories the first label wins.
pub fn classify_roles<I, S>(labels: I) -> Classification
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let owned: Vec<S> = labels.into_iter().collect();
    let labels: Vec<&str> = owned.iter().map(|s| s.as_ref()).collect();

    Classification {
        chapter_roles: labels
            .iter()
            .filter_map(|label| chapter_name(label))
            .map(str::to_string)
            .collect(),
        gender: first_in(&labels, &GENDER_ROLES),
        country: first_in(&labels, &COUNTRY_ROLES),
        city: first_in(&labels, &CITY_ROLES),
        experience: first_in(&labels, &EXPERIENCE_ROLES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classifies_every_category() {
        let classification = classify_roles(["College: ABC", "M", "India", "Delhi", "Tech Junior"]);
        assert_eq!(
            classification,
            Classification {
                chapter_roles: vec!["ABC".to_string()],
                gender: Some("M".to_string()),
                country: Some("India".to_string()),
                city: Some("Delhi".to_string()),
                experience: Some("Tech Junior".to_string()),
            }
        );
    }

    #[test]
    fn test_empty_labels() {
        let classification = classify_roles(Vec::<String>::new());
        assert_eq!(classification, Classification::default());
        assert_eq!(classification.primary_chapter(), None);
    }

    #[test]
    fn test_chapters_keep_label_order() {
        let classification = classify_roles(["College: A", "Corporate: B"]);
        assert_eq!(classification.chapter_roles, vec!["A", "B"]);
        assert_eq!(classification.primary_chapter(), Some("A"));
    }

    #[test]
    fn test_first_match_wins() {
        let classification = classify_roles(["F", "Europe", "M", "India", "Senior Developer", "Tech Senior"]);
        assert_eq!(classification.gender.as_deref(), Some("F"));
        assert_eq!(classification.country.as_deref(), Some("Europe"));
        assert_eq!(classification.experience.as_deref(), Some("Senior Developer"));
        assert_eq!(classification.city, None);
    }

    #[test]
    fn test_matching_is_exact() {
        let classification = classify_roles(["m", "india", "Delhi NCR", "College:NoSpace", "@everyone"]);
        assert_eq!(classification, Classification::default());
    }

    #[test]
    fn test_accepts_owned_labels() {
        let labels = vec!["Corporate: Acme".to_string(), "NB".to_string(), "Kochi".to_string()];
        let classification = classify_roles(&labels);
        assert_eq!(classification.primary_chapter(), Some("Acme"));
        assert_eq!(classification.gender.as_deref(), Some("NB"));
        assert_eq!(classification.city.as_deref(), Some("Kochi"));
    }
}
