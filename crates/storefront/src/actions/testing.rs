//! In-memory collaborators for action tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use axum::http::StatusCode;
use redis_shop_core::{CartEntry, HomepageContent, Price, Product, ProductId, Sourced, UserId};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};

use crate::api::{ApiError, CartAddResponse, CartResponse, CommerceApi, LoginResponse, MeResponse};
use crate::middleware::SessionAccess;

pub const VALID_TOKEN: &str = "tok-valid";
pub const VALID_PASSWORD: &str = "password123";

pub fn product(id: i32, name: &str, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::new(Decimal::from(price)),
        stock,
    }
}

fn remote(status: StatusCode, message: &str) -> ApiError {
    ApiError::Remote {
        status,
        message: message.to_string(),
    }
}

/// Fake commerce service: one user, a product table and a cart.
///
/// Every call is recorded by name so tests can assert on network traffic.
pub struct FakeCommerce {
    calls: Mutex<Vec<String>>,
    products: HashMap<ProductId, Product>,
    homepage: Option<HomepageContent>,
    cart: Mutex<Vec<CartEntry>>,
    outage: Option<(StatusCode, &'static str)>,
}

impl Default for FakeCommerce {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            products: HashMap::new(),
            homepage: None,
            cart: Mutex::new(Vec::new()),
            outage: None,
        }
    }
}

impl FakeCommerce {
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            ..Self::default()
        }
    }

    pub fn with_homepage(mut self, banners: &[&str], featured: &[i32]) -> Self {
        self.homepage = Some(HomepageContent {
            banners: banners.iter().map(ToString::to_string).collect(),
            featured: featured.iter().copied().map(ProductId::new).collect(),
        });
        self
    }

    pub fn with_cart(self, entries: &[(i32, u32)]) -> Self {
        *self.cart.lock().unwrap() = entries
            .iter()
            .map(|&(pid, qty)| CartEntry {
                product_id: ProductId::new(pid),
                quantity: qty,
            })
            .collect();
        self
    }

    /// Every call fails with `status` and `message`.
    pub fn down(status: StatusCode, message: &'static str) -> Self {
        Self {
            outage: Some((status, message)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self.outage {
            Some((status, message)) => Err(remote(status, message)),
            None => Ok(()),
        }
    }

    fn authorize(token: &SecretString) -> Result<(), ApiError> {
        if token.expose_secret() == VALID_TOKEN {
            Ok(())
        } else {
            Err(remote(StatusCode::UNAUTHORIZED, "Invalid or expired session"))
        }
    }
}

impl CommerceApi for FakeCommerce {
    async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, ApiError> {
        self.record(format!("login {email}"))?;
        if password.expose_secret() == VALID_PASSWORD {
            Ok(LoginResponse {
                token: SecretString::from(VALID_TOKEN),
            })
        } else {
            Err(remote(StatusCode::UNAUTHORIZED, "Invalid credentials"))
        }
    }

    async fn get_me(&self, token: &SecretString) -> Result<MeResponse, ApiError> {
        self.record("me".to_string())?;
        Self::authorize(token)?;
        Ok(MeResponse {
            user_id: UserId::new(1),
        })
    }

    async fn get_product(&self, id: ProductId) -> Result<Sourced<Product>, ApiError> {
        self.record(format!("product {id}"))?;
        self.products
            .get(&id)
            .cloned()
            .map(|data| Sourced {
                source: "redis".to_string(),
                data,
            })
            .ok_or_else(|| remote(StatusCode::NOT_FOUND, "HTTP 404"))
    }

    async fn get_homepage(&self) -> Result<Sourced<HomepageContent>, ApiError> {
        self.record("homepage".to_string())?;
        Ok(Sourced {
            source: "origin".to_string(),
            data: self.homepage.clone().unwrap_or_default(),
        })
    }

    async fn add_to_cart(
        &self,
        token: &SecretString,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartAddResponse, ApiError> {
        self.record(format!("cart/add pid={product_id}&qty={quantity}"))?;
        Self::authorize(token)?;
        let mut cart = self.cart.lock().unwrap();
        cart.push(CartEntry {
            product_id,
            quantity,
        });
        Ok(CartAddResponse {
            message: "Added to cart".to_string(),
            cart: cart.clone(),
        })
    }

    async fn get_cart(&self, token: &SecretString) -> Result<CartResponse, ApiError> {
        self.record("cart".to_string())?;
        Self::authorize(token)?;
        Ok(CartResponse {
            cart: self.cart.lock().unwrap().clone(),
        })
    }
}

/// Session held in memory, counting writes.
#[derive(Default)]
pub struct MemorySession {
    token: Option<SecretString>,
    pub writes: usize,
}

impl MemorySession {
    pub fn signed_in(token: &str) -> Self {
        Self {
            token: Some(SecretString::from(token)),
            writes: 0,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(ExposeSecret::expose_secret)
    }
}

impl SessionAccess for MemorySession {
    fn get(&self) -> Option<SecretString> {
        self.token.clone()
    }

    fn set(&mut self, token: SecretString) {
        self.writes += 1;
        self.token = Some(token);
    }

    fn clear(&mut self) {
        self.writes += 1;
        self.token = None;
    }
}
