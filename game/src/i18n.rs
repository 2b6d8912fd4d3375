//! Display strings for every screen, one static table per supported language.
//!
//! Tables are plain structs, so a missing entry is a compile error rather than a runtime
//! fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::question::Difficulty;
use crate::scoring::Rating;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            other => Err(format!("unsupported language `{other}` (expected en or fr)")),
        }
    }
}

#[derive(Debug)]
pub struct Strings {
    pub start: StartStrings,
    pub register: RegisterStrings,
    pub quiz: QuizStrings,
    pub result: ResultStrings,
    pub leaderboard: LeaderboardStrings,
    pub loading: LoadingStrings,
    pub error: ErrorStrings,
}

#[derive(Debug)]
pub struct StartStrings {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub artists: &'static str,
    pub more: &'static str,
    pub start_btn: &'static str,
    pub leaderboard_btn: &'static str,
    pub footer: &'static str,
    pub difficulty: &'static str,
    pub easy: &'static str,
    pub medium: &'static str,
    pub hard: &'static str,
}

#[derive(Debug)]
pub struct RegisterStrings {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub submit: &'static str,
}

#[derive(Debug)]
pub struct QuizStrings {
    pub question: &'static str,
    pub score: &'static str,
    pub by: &'static str,
    pub lyrics_reveal: &'static str,
    pub next_question: &'static str,
    pub finish_quiz: &'static str,
    pub album: &'static str,
    pub release_date: &'static str,
    pub preview_playing: &'static str,
    pub preview_paused: &'static str,
    pub time_up: &'static str,
    pub no_preview: &'static str,
    pub answer_hint: &'static str,
}

#[derive(Debug)]
pub struct ResultStrings {
    pub legend: &'static str,
    pub legend_sub: &'static str,
    pub aficionado: &'static str,
    pub aficionado_sub: &'static str,
    pub solid: &'static str,
    pub solid_sub: &'static str,
    pub casual: &'static str,
    pub casual_sub: &'static str,
    pub ouch: &'static str,
    pub ouch_sub: &'static str,
    pub well_played: &'static str,
    pub performance: &'static str,
    pub correct: &'static str,
    pub incorrect: &'static str,
    pub play_again: &'static str,
    pub leaderboard: &'static str,
}

#[derive(Debug)]
pub struct LeaderboardStrings {
    pub title: &'static str,
    pub back: &'static str,
    pub empty: &'static str,
    pub rank: &'static str,
    pub player: &'static str,
    pub score: &'static str,
    pub date: &'static str,
}

#[derive(Debug)]
pub struct LoadingStrings {
    pub preparing: &'static str,
    pub archives: &'static str,
    pub cancel_hint: &'static str,
}

#[derive(Debug)]
pub struct ErrorStrings {
    pub oops: &'static str,
    pub msg: &'static str,
    pub retry: &'static str,
}

impl Strings {
    pub fn difficulty(&self, difficulty: Difficulty) -> &'static str {
        match difficulty {
            Difficulty::Easy => self.start.easy,
            Difficulty::Medium => self.start.medium,
            Difficulty::Hard => self.start.hard,
        }
    }

    /// Headline and sub-line for a result rating.
    pub fn rating(&self, rating: Rating) -> (&'static str, &'static str) {
        let r = &self.result;
        match rating {
            Rating::Legend => (r.legend, r.legend_sub),
            Rating::Aficionado => (r.aficionado, r.aficionado_sub),
            Rating::Solid => (r.solid, r.solid_sub),
            Rating::Casual => (r.casual, r.casual_sub),
            Rating::Ouch => (r.ouch, r.ouch_sub),
        }
    }
}

pub fn lookup(language: Language) -> &'static Strings {
    match language {
        Language::En => &EN,
        Language::Fr => &FR,
    }
}

static EN: Strings = Strings {
    start: StartStrings {
        title: "BeatTimeline",
        subtitle: "Can you guess the release year?",
        artists: "Damso, Ninho, Booba, Ariana, Cardi B",
        more: "and more.",
        start_btn: "Start Quiz",
        leaderboard_btn: "Leaderboard",
        footer: "Powered by Gemini 2.5 Flash",
        difficulty: "Difficulty",
        easy: "Easy",
        medium: "Medium",
        hard: "Hard",
    },
    register: RegisterStrings {
        title: "Player Profile",
        subtitle: "Enter your details to enter the leaderboard",
        first_name: "First Name",
        last_name: "Surname",
        email: "Email Address",
        phone: "Phone Number",
        submit: "Start the Game",
    },
    quiz: QuizStrings {
        question: "Question",
        score: "Score",
        by: "by",
        lyrics_reveal: "Lyrics Reveal",
        next_question: "Next Question",
        finish_quiz: "Finish Quiz",
        album: "Album",
        release_date: "Release Date",
        preview_playing: "Playing Preview",
        preview_paused: "Preview Paused",
        time_up: "Time's up!",
        no_preview: "No preview for this question",
        answer_hint: "[1-4] or type the year",
    },
    result: ResultStrings {
        legend: "Absolute Legend! 🎧",
        legend_sub: "You are a certified music historian.",
        aficionado: "Music Aficionado! 🔥",
        aficionado_sub: "Impressive knowledge of the charts.",
        solid: "Solid Effort! 🎵",
        solid_sub: "You know your bangers, mostly.",
        casual: "Casual Listener 📻",
        casual_sub: "Maybe check your playlist history?",
        ouch: "Ouch... 📉",
        ouch_sub: "Time to update your Spotify.",
        well_played: "Well played",
        performance: "Performance Chart",
        correct: "Correct",
        incorrect: "Incorrect",
        play_again: "Play Again",
        leaderboard: "Leaderboard",
    },
    leaderboard: LeaderboardStrings {
        title: "Hall of Fame",
        back: "Back to Menu",
        empty: "No records yet. Be the first!",
        rank: "Rank",
        player: "Player",
        score: "Score",
        date: "Date",
    },
    loading: LoadingStrings {
        preparing: "Preparing quiz for",
        archives: "Consulting the music archives...",
        cancel_hint: "/back to cancel",
    },
    error: ErrorStrings {
        oops: "Oops!",
        msg: "Failed to generate quiz. Please check your API Key and connection.",
        retry: "Try Again",
    },
};

static FR: Strings = Strings {
    start: StartStrings {
        title: "BeatTimeline",
        subtitle: "Pouvez-vous deviner l'année ?",
        artists: "Damso, Ninho, Booba, Ariana, Cardi B",
        more: "et plus.",
        start_btn: "Commencer",
        leaderboard_btn: "Classement",
        footer: "Propulsé par Gemini 2.5 Flash",
        difficulty: "Difficulté",
        easy: "Facile",
        medium: "Moyen",
        hard: "Difficile",
    },
    register: RegisterStrings {
        title: "Profil Joueur",
        subtitle: "Entrez vos détails pour rejoindre le classement",
        first_name: "Prénom",
        last_name: "Nom",
        email: "Adresse Email",
        phone: "Numéro de téléphone",
        submit: "Lancer le jeu",
    },
    quiz: QuizStrings {
        question: "Question",
        score: "Score",
        by: "de",
        lyrics_reveal: "Paroles",
        next_question: "Question Suivante",
        finish_quiz: "Terminer le Quiz",
        album: "Album",
        release_date: "Date de sortie",
        preview_playing: "Extrait en cours",
        preview_paused: "Extrait en pause",
        time_up: "Temps écoulé !",
        no_preview: "Pas d'extrait pour cette question",
        answer_hint: "[1-4] ou tapez l'année",
    },
    result: ResultStrings {
        legend: "Légende Absolue ! 🎧",
        legend_sub: "Vous êtes un historien certifié de la musique.",
        aficionado: "Expert Musical ! 🔥",
        aficionado_sub: "Connaissance impressionnante des charts.",
        solid: "Bel Effort ! 🎵",
        solid_sub: "Vous connaissez vos classiques.",
        casual: "Auditeur Occasionnel 📻",
        casual_sub: "Vérifiez peut-être votre historique ?",
        ouch: "Aïe... 📉",
        ouch_sub: "Il est temps de mettre à jour votre playlist.",
        well_played: "Bien joué",
        performance: "Graphique de Performance",
        correct: "Correct",
        incorrect: "Incorrect",
        play_again: "Rejouer",
        leaderboard: "Classement",
    },
    leaderboard: LeaderboardStrings {
        title: "Tableau d'Honneur",
        back: "Retour au Menu",
        empty: "Aucun record. Soyez le premier !",
        rank: "Rang",
        player: "Joueur",
        score: "Score",
        date: "Date",
    },
    loading: LoadingStrings {
        preparing: "Préparation du quiz pour",
        archives: "Consultation des archives musicales...",
        cancel_hint: "/back pour annuler",
    },
    error: ErrorStrings {
        oops: "Oups !",
        msg: "Échec de la génération du quiz. Vérifiez votre clé API et connexion.",
        retry: "Réessayer",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_languages_resolve_and_differ() {
        let en = lookup(Language::En);
        let fr = lookup(Language::Fr);
        assert_eq!(en.start.title, fr.start.title);
        assert_ne!(en.error.msg, fr.error.msg);
        assert_eq!(fr.difficulty(Difficulty::Hard), "Difficile");
    }

    #[test]
    fn language_codes_round_trip_through_parse() {
        for lang in [Language::En, Language::Fr] {
            assert_eq!(lang.code().parse::<Language>(), Ok(lang));
        }
        assert!("de".parse::<Language>().is_err());
    }
}
