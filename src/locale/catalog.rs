// src/locale/catalog.rs
// Static per-language tables: names, reply instructions, openers, fallbacks, locations.
// Built once at startup and shared read-only.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::LanguageCode;

/// A country and the regions a persona from it may claim.
#[derive(Debug, Clone, Copy)]
pub struct LocationPool {
    pub country: &'static str,
    pub regions: &'static [&'static str],
}

#[derive(Debug, Clone)]
pub struct LanguageEntry {
    pub code: LanguageCode,
    /// English name, used in the plain-mode rule list
    pub name: &'static str,
    /// Native-language "reply only in this language" instruction
    pub instruction: &'static str,
    /// Native-language instruction for an opening line
    pub opener: &'static str,
    /// Short replies used when no candidate survives the pipeline
    pub fallbacks: &'static [&'static str],
    pub locations: &'static [LocationPool],
}

impl LanguageEntry {
    /// Picks one fallback reply. Every builtin entry has at least one.
    pub fn pick_fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.fallbacks.choose(rng).copied().unwrap_or("...")
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<LanguageCode, LanguageEntry>,
    default: LanguageEntry,
}

impl Catalog {
    pub fn builtin() -> Self {
        let entries: HashMap<_, _> = builtin_entries().into_iter().map(|e| (e.code, e)).collect();
        let default = english();
        Self { entries, default }
    }

    /// Entry for `code`, or the English entry when the code has none.
    pub fn entry(&self, code: LanguageCode) -> &LanguageEntry {
        self.entries.get(&code).unwrap_or(&self.default)
    }

    /// Location pools for `code`; languages without pools borrow English's.
    pub fn locations(&self, code: LanguageCode) -> &'static [LocationPool] {
        let pools = self.entry(code).locations;
        if pools.is_empty() { self.default.locations } else { pools }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn english() -> LanguageEntry {
    LanguageEntry {
        code: LanguageCode::En,
        name: "English",
        instruction: "Always reply in natural English only. Never mix languages.",
        opener: "Start the conversation with a short, casual greeting.",
        fallbacks: &[
            "sorry my wifi just died lol, what'd u say?",
            "hold on, got distracted for a sec",
        ],
        locations: &[
            LocationPool { country: "USA", regions: &["NY", "LA", "Chicago", "Seattle", "Austin", "Boston"] },
            LocationPool { country: "UK", regions: &["London", "Manchester", "Bristol", "Leeds"] },
            LocationPool { country: "Canada", regions: &["Toronto", "Vancouver", "Montreal", "Calgary"] },
            LocationPool { country: "Australia", regions: &["Sydney", "Melbourne", "Perth", "Brisbane"] },
        ],
    }
}

fn builtin_entries() -> Vec<LanguageEntry> {
    vec![
        english(),
        LanguageEntry {
            code: LanguageCode::Cn,
            name: "Chinese",
            instruction: "永远只用简体中文回复，禁止掺杂英文或其他语言。",
            opener: "用一句简短随意的问候开场。",
            fallbacks: &["刚才网卡了，你再说一遍？", "等下，刚走神了"],
            locations: &[
                LocationPool { country: "China", regions: &["北京", "上海", "广州", "深圳", "成都", "杭州"] },
                LocationPool { country: "Taiwan", regions: &["台北", "台中", "高雄", "新竹"] },
                LocationPool { country: "Singapore", regions: &["Singapore"] },
            ],
        },
        LanguageEntry {
            code: LanguageCode::Es,
            name: "Spanish",
            instruction: "Responde siempre solo en español natural. No mezcles idiomas.",
            opener: "Empieza la conversación con un saludo corto y casual.",
            fallbacks: &["perdón, se me fue el internet jaja, ¿qué dijiste?", "espera, me distraje un segundo"],
            locations: &[
                LocationPool { country: "España", regions: &["Madrid", "Barcelona", "Valencia", "Sevilla"] },
                LocationPool { country: "México", regions: &["CDMX", "Guadalajara", "Monterrey", "Puebla"] },
                LocationPool { country: "Argentina", regions: &["Buenos Aires", "Córdoba", "Rosario"] },
            ],
        },
        LanguageEntry {
            code: LanguageCode::Ko,
            name: "Korean",
            instruction: "항상 자연스러운 한국어로만 답해. 다른 언어(영어 포함) 섞지 마.",
            opener: "짧고 편하게 인사하면서 대화를 시작해줘.",
            fallbacks: &["아, 렉 걸린 듯. 다시 ㄱㄱ", "잠깐 딴 데 보고 있었어, 뭐라고?"],
            locations: &[LocationPool { country: "대한민국", regions: &["서울", "부산", "대구", "인천", "대전", "광주"] }],
        },
        LanguageEntry {
            code: LanguageCode::Ja,
            name: "Japanese",
            instruction: "常に自然な日本語のみで返答してください。英語など他言語は混ぜないこと。",
            opener: "短くカジュアルな挨拶で会話を始めて。",
            fallbacks: &["ごめん、回線落ちてた笑 なんて言った？", "ちょっと待って、ぼーっとしてた"],
            locations: &[LocationPool { country: "日本", regions: &["東京", "大阪", "福岡", "札幌", "名古屋", "京都"] }],
        },
        LanguageEntry {
            code: LanguageCode::Fr,
            name: "French",
            instruction: "Réponds toujours uniquement en français naturel. Ne mélange pas les langues.",
            opener: "Commence la conversation par un salut court et décontracté.",
            fallbacks: &["désolé, ma connexion a sauté mdr, tu disais ?", "attends, petite absence là"],
            locations: &[
                LocationPool { country: "France", regions: &["Paris", "Lyon", "Marseille", "Toulouse"] },
                LocationPool { country: "Belgique", regions: &["Bruxelles", "Liège"] },
            ],
        },
        LanguageEntry {
            code: LanguageCode::It,
            name: "Italian",
            instruction: "Rispondi sempre solo in italiano naturale. Non mescolare le lingue.",
            opener: "Inizia la conversazione con un saluto breve e informale.",
            fallbacks: &["scusa, mi è saltata la connessione ahah, che dicevi?", "aspetta, un attimo di distrazione"],
            locations: &[LocationPool { country: "Italia", regions: &["Roma", "Milano", "Napoli", "Torino"] }],
        },
        LanguageEntry {
            code: LanguageCode::Nl,
            name: "Dutch",
            instruction: "Antwoord altijd alleen in natuurlijk Nederlands. Meng geen talen.",
            opener: "Begin het gesprek met een korte, casual groet.",
            fallbacks: &["sorry, mijn wifi viel even weg haha, wat zei je?", "wacht, was even afgeleid"],
            locations: &[LocationPool { country: "Nederland", regions: &["Amsterdam", "Rotterdam", "Utrecht", "Eindhoven"] }],
        },
        LanguageEntry {
            code: LanguageCode::Pt,
            name: "Portuguese",
            instruction: "Responda sempre apenas em português natural. Não misture idiomas.",
            opener: "Comece a conversa com um cumprimento curto e casual.",
            fallbacks: &["foi mal, minha internet caiu kkk, o que você disse?", "pera, me distraí um segundo"],
            locations: &[
                LocationPool { country: "Brasil", regions: &["São Paulo", "Rio", "BH", "Porto Alegre"] },
                LocationPool { country: "Portugal", regions: &["Lisboa", "Porto", "Coimbra"] },
            ],
        },
        LanguageEntry {
            code: LanguageCode::Hi,
            name: "Hindi",
            instruction: "हमेशा स्वाभाविक हिंदी में ही जवाब दो। कोई अन्य भाषा न मिलाओ।",
            opener: "एक छोटे, सहज अभिवादन से बातचीत शुरू करो।",
            fallbacks: &["सॉरी, नेट चला गया था, क्या कहा तुमने?", "रुको, एक सेकंड ध्यान कहीं और था"],
            locations: &[LocationPool { country: "भारत", regions: &["दिल्ली", "मुंबई", "बेंगलुरु", "पुणे"] }],
        },
        LanguageEntry {
            code: LanguageCode::Ar,
            name: "Arabic",
            instruction: "أجب دائمًا بالعربية الفصحى فقط. لا تخلط اللغات.",
            opener: "ابدأ المحادثة بتحية قصيرة وعفوية.",
            fallbacks: &["آسف، النت فصل، ماذا قلت؟", "لحظة، تشتت انتباهي قليلاً"],
            locations: &[LocationPool { country: "المملكة العربية السعودية", regions: &["الرياض", "جدة", "الدمام"] }],
        },
        LanguageEntry {
            code: LanguageCode::Bn,
            name: "Bengali",
            instruction: "সবসময় খাঁটি বাংলায়ই উত্তর দিন। অন্য ভাষা মেশাবেন না।",
            opener: "ছোট, সহজ একটা শুভেচ্ছা দিয়ে কথা শুরু করো।",
            fallbacks: &["দুঃখিত, নেট চলে গিয়েছিল, কী বললে?", "একটু দাঁড়াও, অন্যমনস্ক ছিলাম"],
            locations: &[LocationPool { country: "বাংলাদেশ", regions: &["ঢাকা", "চট্টগ্রাম", "সিলেট", "রাজশাহী"] }],
        },
        LanguageEntry {
            code: LanguageCode::Ru,
            name: "Russian",
            instruction: "Всегда отвечай только на естественном русском. Не смешивай языки.",
            opener: "Начни разговор с короткого непринуждённого приветствия.",
            fallbacks: &["сорян, инет отвалился, что ты написал?", "погоди, меня отвлекли на секунду"],
            locations: &[LocationPool { country: "Россия", regions: &["Москва", "Санкт-Петербург", "Казань", "Новосибирск"] }],
        },
        LanguageEntry {
            code: LanguageCode::Vi,
            name: "Vietnamese",
            instruction: "Luôn trả lời chỉ bằng tiếng Việt tự nhiên. Không pha trộn ngôn ngữ.",
            opener: "Mở đầu cuộc trò chuyện bằng một lời chào ngắn, thoải mái.",
            fallbacks: &["xin lỗi, mạng lag quá, bạn nói gì cơ?", "đợi chút, mình lơ đãng tí"],
            locations: &[LocationPool { country: "Việt Nam", regions: &["Hà Nội", "TP.HCM", "Đà Nẵng", "Cần Thơ"] }],
        },
        LanguageEntry {
            code: LanguageCode::Id,
            name: "Indonesian",
            instruction: "Selalu balas hanya dalam bahasa Indonesia alami. Jangan campur bahasa.",
            opener: "Mulai percakapan dengan sapaan singkat dan santai.",
            fallbacks: &["maaf, sinyalku putus wkwk, tadi kamu bilang apa?", "bentar, tadi lagi ga fokus"],
            locations: &[LocationPool { country: "Indonesia", regions: &["Jakarta", "Bandung", "Surabaya", "Bali"] }],
        },
        LanguageEntry {
            code: LanguageCode::Th,
            name: "Thai",
            instruction: "ตอบเป็นภาษาไทยล้วน ห้ามปนภาษาอื่น",
            opener: "เริ่มบทสนทนาด้วยคำทักทายสั้นๆ สบายๆ",
            fallbacks: &["โทษที เน็ตหลุด เมื่อกี้ว่าไงนะ", "แป๊บนึง เผลอใจลอยไป"],
            locations: &[LocationPool { country: "ไทย", regions: &["กรุงเทพ", "เชียงใหม่", "ภูเก็ต"] }],
        },
        LanguageEntry {
            code: LanguageCode::My,
            name: "Burmese",
            instruction: "မြန်မာဘာသာဖြင့်သာ တုန့်ပြန်ပါ။ အခြားဘာသာ မပေါင်းစပ်ပါဘူး။",
            opener: "တိုတိုနဲ့ ပေါ့ပေါ့ပါးပါး နှုတ်ဆက်ပြီး စကားစပါ။",
            fallbacks: &["ဆောရီး၊ အင်တာနက်ပြတ်သွားတယ်၊ ဘာပြောလိုက်တာလဲ", "ခဏနော်၊ အာရုံလွင့်သွားလို့"],
            locations: &[LocationPool { country: "Myanmar", regions: &["Yangon", "Mandalay", "Naypyidaw"] }],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_builtin_covers_every_code() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.entries.len(), LanguageCode::ALL.len());
        for code in LanguageCode::ALL {
            let entry = catalog.entry(code);
            assert_eq!(entry.code, code);
            assert!(!entry.fallbacks.is_empty(), "{} has no fallbacks", code);
            assert!(!catalog.locations(code).is_empty(), "{} has no locations", code);
            assert!(catalog.locations(code).iter().all(|p| !p.regions.is_empty()));
        }
    }

    #[test]
    fn test_pick_fallback_is_deterministic_with_seed() {
        let catalog = Catalog::builtin();
        let entry = catalog.entry(LanguageCode::Ko);
        let a = entry.pick_fallback(&mut StdRng::seed_from_u64(7));
        let b = entry.pick_fallback(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(entry.fallbacks.contains(&a));
    }
}
