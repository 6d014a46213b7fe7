//! Static shop and subscription catalogs.

use crate::{action::GameAction, ledger::Subscription, types::Money};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Treats,
    Entertainment,
    Tech,
    Goals,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ShopItem {
    pub id:       &'static str,
    pub name:     &'static str,
    pub price:    Money,
    pub icon:     &'static str,
    pub category: ItemCategory,
}

impl ShopItem {
    pub fn purchase(&self) -> GameAction {
        GameAction::buy(self.name, self.price, self.icon)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SubscriptionItem {
    pub id:           &'static str,
    pub name:         &'static str,
    pub monthly_cost: Money,
    pub icon:         &'static str,
}

impl SubscriptionItem {
    pub fn to_subscription(&self) -> Subscription {
        Subscription::new(self.id, self.name, self.monthly_cost, self.icon)
    }

    pub fn subscribe(&self) -> GameAction {
        GameAction::AddSubscription { subscription: self.to_subscription() }
    }
}

const fn item(
    id: &'static str,
    name: &'static str,
    price: Money,
    icon: &'static str,
    category: ItemCategory,
) -> ShopItem {
    ShopItem { id, name, price, icon, category }
}

pub const SHOP_ITEMS: &[ShopItem] = &[
    item("candy",      "Candy",           5,   "🍬", ItemCategory::Treats),
    item("icecream",   "Ice Cream",       8,   "🍦", ItemCategory::Treats),
    item("pizza",      "Pizza",           12,  "🍕", ItemCategory::Treats),
    item("popcorn",    "Popcorn",         6,   "🍿", ItemCategory::Treats),
    item("movie",      "Movie Ticket",    15,  "🎬", ItemCategory::Entertainment),
    item("game",       "Video Game",      50,  "🎮", ItemCategory::Entertainment),
    item("concert",    "Concert",         75,  "🎤", ItemCategory::Entertainment),
    item("headphones", "Headphones",      60,  "🎧", ItemCategory::Tech),
    item("sneakers",   "Sneakers",        80,  "👟", ItemCategory::Tech),
    item("skateboard", "Skateboard",      120, "🛹", ItemCategory::Tech),
    item("switch",     "Nintendo Switch", 350, "🕹️", ItemCategory::Goals),
    item("iphone",     "iPhone",          500, "📱", ItemCategory::Goals),
];

const fn sub(
    id: &'static str,
    name: &'static str,
    monthly_cost: Money,
    icon: &'static str,
) -> SubscriptionItem {
    SubscriptionItem { id, name, monthly_cost, icon }
}

pub const SUBSCRIPTION_ITEMS: &[SubscriptionItem] = &[
    sub("roblox",    "Roblox Premium",   15, "🟩"),
    sub("minecraft", "Minecraft Realms", 10, "⛏️"),
    sub("disney",    "Disney+",          12, "🏰"),
    sub("spotify",   "Spotify Kids",     8,  "🎵"),
    sub("pokemon",   "Pokémon GO+",      5,  "⚡"),
    sub("youtube",   "YouTube Premium",  14, "▶️"),
    sub("fortnite",  "Fortnite Crew",    12, "🎯"),
    sub("books",     "Epic! Books",      10, "📚"),
];

pub fn shop_item(id: &str) -> Option<&'static ShopItem> {
    SHOP_ITEMS.iter().find(|i| i.id == id)
}

pub fn subscription_item(id: &str) -> Option<&'static SubscriptionItem> {
    SUBSCRIPTION_ITEMS.iter().find(|s| s.id == id)
}

pub fn items_in(category: ItemCategory) -> impl Iterator<Item = &'static ShopItem> {
    SHOP_ITEMS.iter().filter(move |i| i.category == category)
}
