//! Role-based authorization.
//!
//! Each resource type has a policy answering two questions for an [`Actor`]:
//! may it perform an [`Action`] on a given record, and which records of the
//! collection may it see at all (the scope).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::order::OrderView;
use super::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Customer,
    Supplier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Supplier => "supplier",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "supplier" => Ok(Role::Supplier),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::Persistence(format!("unknown role '{other}'"))),
        }
    }
}

/// The signed-in user a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    /// Brands the user supplies; empty for non-suppliers.
    pub brand_ids: Vec<i64>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_supplier(&self) -> bool {
        self.role == Role::Supplier
    }

    pub fn owns_brand(&self, brand_id: Option<i64>) -> bool {
        brand_id.is_some_and(|id| self.brand_ids.contains(&id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Show,
    Create,
    Update,
    Destroy,
}

pub trait Policy {
    type Resource;
    type Scope;

    fn permits(actor: &Actor, action: Action, resource: Option<&Self::Resource>) -> bool;

    fn scope(actor: &Actor) -> Self::Scope;

    fn authorize(
        actor: &Actor,
        action: Action,
        resource: Option<&Self::Resource>,
    ) -> Result<(), DomainError> {
        if Self::permits(actor, action, resource) {
            Ok(())
        } else {
            log::warn!(
                "User {} ({}) denied {:?}",
                actor.user_id,
                actor.role,
                action
            );
            Err(DomainError::Forbidden)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductScope {
    All,
    Brands(Vec<i64>),
}

pub struct ProductPolicy;

impl Policy for ProductPolicy {
    type Resource = Product;
    type Scope = ProductScope;

    fn permits(actor: &Actor, action: Action, resource: Option<&Product>) -> bool {
        match action {
            Action::Index | Action::Show => true,
            Action::Create => actor.is_admin() || actor.is_supplier(),
            Action::Update | Action::Destroy => {
                actor.is_admin()
                    || (actor.is_supplier()
                        && resource.is_some_and(|p| actor.owns_brand(p.brand_id)))
            }
        }
    }

    fn scope(actor: &Actor) -> ProductScope {
        match actor.role {
            Role::Supplier => ProductScope::Brands(actor.brand_ids.clone()),
            Role::Admin | Role::Customer => ProductScope::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    OwnedBy(i64),
}

pub struct OrderPolicy;

impl Policy for OrderPolicy {
    type Resource = OrderView;
    type Scope = OrderScope;

    fn permits(actor: &Actor, action: Action, resource: Option<&OrderView>) -> bool {
        match action {
            Action::Index | Action::Create => true,
            Action::Show => {
                actor.is_admin() || resource.is_some_and(|o| o.user_id == actor.user_id)
            }
            Action::Update | Action::Destroy => actor.is_admin(),
        }
    }

    fn scope(actor: &Actor) -> OrderScope {
        if actor.is_admin() {
            OrderScope::All
        } else {
            OrderScope::OwnedBy(actor.user_id)
        }
    }
}
