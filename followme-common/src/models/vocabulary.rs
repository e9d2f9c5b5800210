// File: followme-common/src/models/vocabulary.rs
//! Localized phrases for the dialogue: what the robot says and which
//! substrings it listens for. Selected once at startup from a `Language`.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
}

impl Language {
    /// TTS voice name for this language.
    pub fn voice(&self) -> &'static str {
        match self {
            Language::English => "mb-en1",
            Language::Spanish => "mb-es1",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Spanish => write!(f, "spanish"),
        }
    }
}

impl FromStr for Language {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" => Ok(Language::English),
            "spanish" => Ok(Language::Spanish),
            _ => Err(format!(
                "Language not found, please use 'english' or 'spanish', got: {}",
                s
            )),
        }
    }
}

/// Everything the robot can say.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SentenceId {
    Presentation1,
    Presentation2,
    Presentation3,
    AskName,
    Answer1,
    Answer2,
    Answer3,
    NotUnderstand,
    OkFollow,
    StopFollow,
    OnTheRight,
    OnTheLeft,
    OnTheCenter,
}

/// Phrases matched (as substrings) against recognized speech.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum VoiceCommand {
    HiTeo,
    FollowMe,
    MyNameIs,
    StopFollowing,
}

/// Recognizer dictionary shared by both languages.
pub const DICTIONARY: &str = "follow-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocabulary {
    language: Language,
}

impl Vocabulary {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn sentence(&self, id: SentenceId) -> &'static str {
        match self.language {
            Language::English => english_sentence(id),
            Language::Spanish => spanish_sentence(id),
        }
    }

    pub fn command(&self, cmd: VoiceCommand) -> &'static str {
        match (self.language, cmd) {
            (Language::English, VoiceCommand::HiTeo) => "hi teo",
            (Language::English, VoiceCommand::FollowMe) => "follow me",
            (Language::English, VoiceCommand::MyNameIs) => "my name is",
            (Language::English, VoiceCommand::StopFollowing) => "stop following",
            (Language::Spanish, VoiceCommand::HiTeo) => "hola teo",
            (Language::Spanish, VoiceCommand::FollowMe) => "sigueme",
            (Language::Spanish, VoiceCommand::MyNameIs) => "me llamo",
            (Language::Spanish, VoiceCommand::StopFollowing) => "para teo",
        }
    }

    /// Substring test of `heard` against the localized command.
    pub fn matches(&self, heard: &str, cmd: VoiceCommand) -> bool {
        heard.contains(self.command(cmd))
    }
}

fn english_sentence(id: SentenceId) -> &'static str {
    match id {
        SentenceId::Presentation1 => "Follow me, demostration started.",
        SentenceId::Presentation2 => "Hello. My name is TEO. I am, a humanoid robot, of Carlos tercero, university.",
        SentenceId::Presentation3 => "Now, I will follow you. Please, tell me.",
        SentenceId::AskName => "Could you tell me your name.",
        SentenceId::Answer1 => "Is, a beatifull name. I love it.",
        SentenceId::Answer2 => "Is, a wonderfull name. My human creator, has the same name.",
        SentenceId::Answer3 => "My parents, didn't want to baptize me, with that name.",
        SentenceId::NotUnderstand => "Sorry, I don't understand.",
        SentenceId::OkFollow => "Okay, I will follow you.",
        SentenceId::StopFollow => "Okay, I will stop following you. See you later.",
        SentenceId::OnTheRight => "You are, on my, right.",
        SentenceId::OnTheLeft => "You are, on my, left.",
        SentenceId::OnTheCenter => "You are, on the, center.",
    }
}

fn spanish_sentence(id: SentenceId) -> &'static str {
    match id {
        SentenceId::Presentation1 => "Demostración de detección de caras iniciada.",
        SentenceId::Presentation2 => "Hola. Me yamo Teo, y soy un grobot humanoide diseñado por ingenieros de la universidad carlos tercero.",
        SentenceId::Presentation3 => "Por favor, dime qué quieres que haga.",
        SentenceId::AskName => "Podrías decirme tu nombre.",
        SentenceId::Answer1 => "Uuooooo ouu, que nombre más bonito. Me encanta.",
        SentenceId::Answer2 => "Que gran nombre. Mi creador humano se yama igual.",
        SentenceId::Answer3 => "Mis padres no quisieron bauuutizarme con ese nombre. Malditos.",
        SentenceId::NotUnderstand => "Lo siento. No te he entendido.",
        SentenceId::OkFollow => "Vale. Voy, a comenzar a seguirte.",
        SentenceId::StopFollow => "De acuerdo. Voy, a dejar de seguirte. Hasta pronto.",
        SentenceId::OnTheRight => "Ahora, estás, a mi derecha.",
        SentenceId::OnTheLeft => "Ahora, estás, a mi izquierda.",
        SentenceId::OnTheCenter => "Ahora, estás, en el centro.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parsing() {
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!("spanish".parse::<Language>().unwrap(), Language::Spanish);
        assert!("klingon".parse::<Language>().is_err());
        assert_eq!(Language::Spanish.voice(), "mb-es1");
    }

    #[test]
    fn test_commands_match_by_substring() {
        let en = Vocabulary::new(Language::English);
        assert!(en.matches("please follow me now", VoiceCommand::FollowMe));
        assert!(!en.matches("please follow", VoiceCommand::FollowMe));

        let es = Vocabulary::new(Language::Spanish);
        assert!(es.matches("hola, me llamo juan", VoiceCommand::MyNameIs));
        assert_eq!(es.sentence(SentenceId::OnTheLeft), "Ahora, estás, a mi izquierda.");
    }
}
