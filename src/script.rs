use crate::api::openai;
use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

pub const PREDEFINED_SCRIPTS: &[&str] = &[
    "Ek raat school ke chowkidar ne dekha ki teesri manzil ki batti jal rahi thi, jabke school band tha. Woh upar gaya to classroom mein ek bachcha akela betha tha. Chowkidar ne pucha, 'Tum yahan kya kar rahe ho?' Bachche ne dheere se sar uthaya aur bola, 'Main to roz yahan betha hoon, aap pehli baar dikhe ho.' Agle din register dekha to us naam ka bachcha dus saal pehle school ke talaab mein doob chuka tha. Us raat ke baad woh batti phir kabhi nahi jali. Part 2 ke liye follow karo!",
    "Ek aadmi ne shehar se door ek purana ghar sasta kharida. Pehli raat usse deewar ke andar se khatkhatane ki aawaz aayi. Usne deewar todi to ek chhota darwaza nikla, jiske peeche seedhiyan andhere mein neeche ja rahi thi. Neeche utra to usne apni hi tasveer deewar par tangi dekhi, jabke woh us ghar mein pehli baar aaya tha. Tasveer ke neeche likha tha, 'Hum tumhara intezar kar rahe the.' Woh bhaga, lekin seedhiyan upar khatam hi nahi ho rahi thi. Part 2 ke liye follow karo!",
    "Ek ladki raat ko apni behen se phone par baat kar rahi thi. Behen ne kaha, 'Darwaza mat kholna, main abhi ghar se bahar hoon.' Tabhi darwaze par dastak hui aur behen ki aawaz aayi, 'Khol do, main aa gayi.' Ladki ne phone par pucha, 'Kya tum darwaze par ho?' Behen boli, 'Nahi, main to abhi bus mein hoon.' Dastak tez hoti gayi, aur jo darwaze par tha, woh behen ki aawaz mein hansne laga. Part 2 ke liye follow karo!",
];

#[async_trait]
pub trait ScriptProvider: Send {
    async fn narration(&mut self) -> Result<String>;
}

pub struct PredefinedScripts<R: Rng + Send> {
    rng: R,
}

impl<R: Rng + Send> PredefinedScripts<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl<R: Rng + Send> ScriptProvider for PredefinedScripts<R> {
    async fn narration(&mut self) -> Result<String> {
        let idx = self.rng.gen_range(0..PREDEFINED_SCRIPTS.len());
        Ok(PREDEFINED_SCRIPTS[idx].to_string())
    }
}

pub struct OpenAiScripts {
    client: reqwest::Client,
    config: Config,
}

impl OpenAiScripts {
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ScriptProvider for OpenAiScripts {
    async fn narration(&mut self) -> Result<String> {
        match openai::generate_narration(&self.client, &self.config).await? {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => anyhow::bail!("script generation returned no text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[tokio::test]
    async fn predefined_provider_returns_one_of_the_known_scripts() {
        let mut provider = PredefinedScripts::new(StdRng::seed_from_u64(3));
        let text = provider.narration().await.unwrap();
        assert!(!text.is_empty());
        assert!(PREDEFINED_SCRIPTS.contains(&text.as_str()));
    }

    #[tokio::test]
    async fn predefined_provider_is_deterministic_per_seed() {
        let mut a = PredefinedScripts::new(StdRng::seed_from_u64(11));
        let mut b = PredefinedScripts::new(StdRng::seed_from_u64(11));
        assert_eq!(a.narration().await.unwrap(), b.narration().await.unwrap());
    }
}
