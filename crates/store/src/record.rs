//! Records persisted by the store.
//!
//! JSON field names follow the web client: camelCase, with identifiers
//! under `_id`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PlantId, PurchaseId};

/// The seller who listed a plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub email: String,
}

/// A plant as submitted by a seller, before it has an identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlant {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Unit price in the store currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    /// URL of the image uploaded by the client.
    #[serde(default)]
    pub image: String,
    pub seller: Seller,
}

/// A plant listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    #[serde(rename = "_id")]
    pub id: PlantId,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    pub image: String,
    pub seller: Seller,
}

impl Plant {
    /// Builds a plant record from submitted fields and an assigned id.
    pub fn from_new(id: PlantId, new: NewPlant) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            category: new.category,
            price: new.price,
            quantity: new.quantity,
            image: new.image,
            seller: new.seller,
        }
    }

    /// Replaces the editable fields. The seller is never changed.
    pub fn apply_update(&mut self, update: PlantUpdate) {
        self.name = update.name;
        self.description = update.description;
        self.category = update.category;
        self.price = update.price;
        self.quantity = update.quantity;
        self.image = update.image;
    }
}

/// Editable plant fields sent by the seller dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantUpdate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

/// The customer who made a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A checkout request from a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub plant_id: PlantId,
    pub customer: Customer,
    pub quantity: u32,
    #[serde(default)]
    pub address: Option<String>,
}

/// An immutable record of a customer buying a quantity of a plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(rename = "_id")]
    pub id: PurchaseId,
    pub plant_id: PlantId,
    pub customer: Customer,
    pub quantity: u32,
    /// Total paid: unit price at checkout times quantity.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub address: Option<String>,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A purchase joined with the current name, image and category of its plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDetails {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub name: String,
    pub image: String,
    pub category: String,
}

impl PurchaseDetails {
    /// Annotates a purchase with fields read from its plant.
    pub fn join(purchase: Purchase, plant: &Plant) -> Self {
        Self {
            purchase,
            name: plant.name.clone(),
            image: plant.image.clone(),
            category: plant.category.clone(),
        }
    }
}

/// A marketplace user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Profile fields sent by the client on first login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A marketplace user, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: Role,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}
