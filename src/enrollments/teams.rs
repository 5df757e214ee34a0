/// One of the selectable teams.
#[derive(Debug, PartialEq, Eq)]
pub struct Team {
    pub name: &'static str,
    pub sport: &'static str,
    /// Font Awesome classes.
    pub icon: &'static str,
    pub color: &'static str,
    pub hover_color: &'static str,
}

pub static TEAMS: [Team; 3] = [
    Team {
        name: "Matira",
        sport: "Vôlei",
        icon: "fas fa-volleyball-ball",
        color: "#3b82f6",
        hover_color: "#1e40af",
    },
    Team {
        name: "Nexon",
        sport: "Basquete",
        icon: "fas fa-basketball-ball",
        color: "#ef4444",
        hover_color: "#b91c1c",
    },
    Team {
        name: "Falxtra",
        sport: "Futsal",
        icon: "fas fa-futbol",
        color: "#8b5cf6",
        hover_color: "#6d28d9",
    },
];

impl Team {
    pub fn find(name: &str) -> Option<&'static Team> {
        TEAMS.iter().find(|team| team.name == name)
    }

    /// The team the admin dashboard opens on.
    pub fn first() -> &'static Team {
        &TEAMS[0]
    }
}

#[cfg(test)]
#[test]
fn lookup_is_exact() {
    assert_eq!(Team::find("Nexon").map(|t| t.sport), Some("Basquete"));
    assert!(Team::find("nexon").is_none());
    assert!(Team::find("").is_none());
}
