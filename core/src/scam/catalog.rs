//! Scripted scam scenarios.

use super::trigger::ScamChoice;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DangerLevel {
    Low,
    Medium,
    High,
}

/// A fake advert or alert that pops up mid-game.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PopupScam {
    pub id:           &'static str,
    pub title:        &'static str,
    pub message:      &'static str,
    pub icon:         &'static str,
    pub button_text:  &'static str,
    pub danger_level: DangerLevel,
    pub explanation:  &'static str,
    pub red_flags:    &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Caller,
    Player,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DialogueOption {
    pub text:     &'static str,
    pub is_safe:  bool,
    pub response: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: Speaker,
    pub text:    &'static str,
    pub options: &'static [DialogueOption],
}

/// A scripted phone call where the player picks a reply.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CallScam {
    pub id:           &'static str,
    pub caller_name:  &'static str,
    pub caller_icon:  &'static str,
    pub dialogue:     &'static [DialogueLine],
    pub danger_level: DangerLevel,
    pub explanation:  &'static str,
    pub red_flags:    &'static [&'static str],
}

impl CallScam {
    /// Options offered to the player, from the first line that has any.
    pub fn options(&self) -> &'static [DialogueOption] {
        self.dialogue
            .iter()
            .find(|line| !line.options.is_empty())
            .map(|line| line.options)
            .unwrap_or(&[])
    }

    /// Map the player's chosen reply to an outcome.
    pub fn judge(&self, option_index: usize) -> Option<ScamChoice> {
        self.options().get(option_index).map(|opt| {
            if opt.is_safe {
                ScamChoice::AvoidedIt
            } else {
                ScamChoice::FellForIt
            }
        })
    }
}

pub static POPUP_SCAMS: &[PopupScam] = &[
    PopupScam {
        id: "prize-winner",
        title: "🎉 YOU WON $500! 🎉",
        message: "Congratulations! You won $500 cash! Just enter your bank account number to receive your prize money!",
        icon: "💵",
        button_text: "CLAIM MY MONEY!!!",
        danger_level: DangerLevel::High,
        explanation: "Real prizes NEVER ask for your bank account! Scammers use this to steal money FROM you instead of giving money TO you.",
        red_flags: &[
            "Asks for bank account info",
            "You didn't enter any contest",
            "Too good to be true",
            "Rushes you to act fast",
        ],
    },
    PopupScam {
        id: "double-money",
        title: "💰 DOUBLE YOUR MONEY! 💰",
        message: "Send us $10 and we'll send you back $100! Limited time offer! Enter your payment app username!",
        icon: "🤑",
        button_text: "Get Rich Quick!",
        danger_level: DangerLevel::High,
        explanation: "Nobody can magically multiply your money! This is a trick to steal your $10 and your account info.",
        red_flags: &[
            "Promises free money",
            "Asks you to send money first",
            "Wants your payment info",
            "Sounds too easy",
        ],
    },
    PopupScam {
        id: "gift-card-deal",
        title: "🎁 GIFT CARD HACK! 🎁",
        message: "Get FREE gift cards! Just share your parent's credit card number to verify your age!",
        icon: "💳",
        button_text: "Get Free Cards!",
        danger_level: DangerLevel::High,
        explanation: "NEVER share credit card numbers! This is a trick to steal money. Free gift cards don't need credit card \"verification\".",
        red_flags: &[
            "Asks for credit card info",
            "Free items need payment info?",
            "Not from a real store",
            "Fake \"age verification\"",
        ],
    },
    PopupScam {
        id: "investment-scam",
        title: "📈 KIDS INVEST APP! 📈",
        message: "Turn your allowance into $1000! Download our app and connect your savings account to start!",
        icon: "💎",
        button_text: "Start Investing!",
        danger_level: DangerLevel::High,
        explanation: "Real investing takes time and has risks. Apps promising huge instant returns want to steal your savings!",
        red_flags: &[
            "Promises huge returns",
            "Wants access to savings",
            "Unknown app",
            "Too good to be true",
        ],
    },
    PopupScam {
        id: "payment-app-scam",
        title: "⚠️ ACCOUNT LOCKED! ⚠️",
        message: "Your payment app is locked! Enter your PIN and password here to unlock it immediately!",
        icon: "🔒",
        button_text: "Unlock Now!",
        danger_level: DangerLevel::High,
        explanation: "Real apps NEVER ask for your password through popups! This is trying to steal your login to take your money.",
        red_flags: &[
            "Asks for PIN and password",
            "Creates panic with \"locked\"",
            "Not from the real app",
            "Popups can't lock accounts",
        ],
    },
];

pub static CALL_SCAMS: &[CallScam] = &[
    CallScam {
        id: "bank-call",
        caller_name: "Your Bank",
        caller_icon: "🏦",
        dialogue: &[
            DialogueLine { speaker: Speaker::Caller, text: "Hello! This is your bank calling. We detected someone trying to steal money from your account! Quick, tell me your card number and PIN so I can protect your money!", options: &[] },
            DialogueLine {
                speaker: Speaker::Player,
                text: "",
                options: &[
                    DialogueOption { text: "Oh no! My card number is...", is_safe: false, response: "Perfect! Now give me the PIN and I'll \"protect\" your account... 😈" },
                    DialogueOption { text: "I'll call my bank using the number on my card", is_safe: true, response: "*Click* The scammer hung up!" },
                    DialogueOption { text: "Let me ask my parent first", is_safe: true, response: "*Click* The scammer hung up because parents can spot scams!" },
                ],
            },
        ],
        danger_level: DangerLevel::High,
        explanation: "Real banks NEVER call and ask for your card number or PIN! They already have your info. Always hang up and call the number on your card!",
        red_flags: &[
            "Banks never ask for PIN",
            "Creates panic about stolen money",
            "Caller ID can be faked",
            "Rushes you to share info",
        ],
    },
    CallScam {
        id: "allowance-double",
        caller_name: "Money Helper",
        caller_icon: "💰",
        dialogue: &[
            DialogueLine { speaker: Speaker::Caller, text: "Hi kid! Want to double your allowance? Just send me your savings through a gift card, and I'll send back TWICE as much! It's a special deal just for you!", options: &[] },
            DialogueLine {
                speaker: Speaker::Player,
                text: "",
                options: &[
                    DialogueOption { text: "Wow! I'll get a gift card right now!", is_safe: false, response: "Read me the code on the back and your money will be gone forever..." },
                    DialogueOption { text: "That sounds too good to be true", is_safe: true, response: "*Click* Smart kid! The scammer gave up!" },
                    DialogueOption { text: "I need to check with an adult", is_safe: true, response: "*Click* The scammer hung up fast!" },
                ],
            },
        ],
        danger_level: DangerLevel::High,
        explanation: "Nobody can magically double your money! Once you give away gift card codes, your money is GONE forever and can't be traced!",
        red_flags: &[
            "Promises free money",
            "Wants gift card codes",
            "Too good to be true",
            "Stranger calling about money",
        ],
    },
    CallScam {
        id: "payment-app",
        caller_name: "Payment App Support",
        caller_icon: "📱",
        dialogue: &[
            DialogueLine { speaker: Speaker::Caller, text: "This is Payment App security! Someone is trying to steal from your account RIGHT NOW! Give me your password so I can stop them and save your money!", options: &[] },
            DialogueLine {
                speaker: Speaker::Player,
                text: "",
                options: &[
                    DialogueOption { text: "Hurry! My password is...", is_safe: false, response: "Thanks! Now I'll \"protect\" your account by taking all your money..." },
                    DialogueOption { text: "Real apps never ask for passwords on calls", is_safe: true, response: "*Click* You're right! The scammer hung up!" },
                    DialogueOption { text: "I'm telling an adult about this", is_safe: true, response: "*Click* The scammer vanished!" },
                ],
            },
        ],
        danger_level: DangerLevel::High,
        explanation: "Real payment apps NEVER call and ask for your password! They have secure ways to protect your account without needing your password.",
        red_flags: &[
            "Asks for password on phone",
            "Creates panic about theft",
            "Real apps don't call kids",
            "Rushes you to act now",
        ],
    },
    CallScam {
        id: "gift-card-winner",
        caller_name: "Prize Center",
        caller_icon: "🎁",
        dialogue: &[
            DialogueLine { speaker: Speaker::Caller, text: "You won $1000! To claim your prize money, just buy a $50 gift card and read me the code. We'll send your $1000 right after!", options: &[] },
            DialogueLine {
                speaker: Speaker::Player,
                text: "",
                options: &[
                    DialogueOption { text: "Let me get the gift card!", is_safe: false, response: "Read me those numbers and you'll never see that $50 again..." },
                    DialogueOption { text: "Real prizes don't cost money!", is_safe: true, response: "*Click* Exactly right! The scammer hung up!" },
                    DialogueOption { text: "I didn't enter any contest", is_safe: true, response: "*Click* The scammer couldn't answer that!" },
                ],
            },
        ],
        danger_level: DangerLevel::High,
        explanation: "You NEVER have to pay money to receive a prize! Real contests are free. Scammers take your gift card money and disappear!",
        red_flags: &[
            "Must pay to get \"free\" money",
            "Wants gift card payment",
            "You didn't enter anything",
            "Sounds too good to be true",
        ],
    },
];

pub fn popup_scam(id: &str) -> Option<&'static PopupScam> {
    POPUP_SCAMS.iter().find(|s| s.id == id)
}

pub fn call_scam(id: &str) -> Option<&'static CallScam> {
    CALL_SCAMS.iter().find(|s| s.id == id)
}
