use crate::domain::errors::DomainError;
use crate::domain::policy::{Action, Actor, Policy, ProductPolicy, ProductScope};
use crate::domain::ports::ProductRepository;
use crate::domain::product::{Product, ProductParams};

#[derive(Clone)]
pub struct ProductService<R> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Guests browse like customers.
    pub fn list(&self, actor: Option<&Actor>) -> Result<Vec<Product>, DomainError> {
        let scope = actor.map_or(ProductScope::All, ProductPolicy::scope);
        self.repo.list(&scope)
    }

    pub fn get(&self, id: i64) -> Result<Product, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn create(&self, actor: &Actor, params: ProductParams) -> Result<Product, DomainError> {
        ProductPolicy::authorize(actor, Action::Create, None)?;
        let input = params.validate()?;
        let product = self.repo.create(&input)?;
        log::info!("User {} created product {}", actor.user_id, product.id);
        Ok(product)
    }

    pub fn update(&self, actor: &Actor, id: i64, params: ProductParams) -> Result<Product, DomainError> {
        let product = self.get(id)?;
        ProductPolicy::authorize(actor, Action::Update, Some(&product))?;

        let input = params.merged_onto(&product).validate()?;
        if actor.is_supplier() && !actor.owns_brand(input.brand_id) {
            return Err(DomainError::Forbidden);
        }
        self.repo.update(id, &input)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn delete(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        let product = self.get(id)?;
        ProductPolicy::authorize(actor, Action::Destroy, Some(&product))?;
        if self.repo.delete(id)? {
            log::info!("User {} deleted product {}", actor.user_id, id);
            Ok(())
        } else {
            Err(DomainError::NotFound("Product"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bigdecimal::BigDecimal;
    use chrono::Utc;

    use super::*;
    use crate::domain::policy::Role;
    use crate::domain::product::ProductInput;

    #[derive(Default)]
    struct FakeProductRepository {
        products: Mutex<Vec<Product>>,
        scopes: Mutex<Vec<ProductScope>>,
    }

    impl ProductRepository for FakeProductRepository {
        fn list(&self, scope: &ProductScope) -> Result<Vec<Product>, DomainError> {
            self.scopes.lock().unwrap().push(scope.clone());
            Ok(self.products.lock().unwrap().clone())
        }

        fn find_by_id(&self, id: i64) -> Result<Option<Product>, DomainError> {
            Ok(self.products.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        fn create(&self, input: &ProductInput) -> Result<Product, DomainError> {
            let product = product(100, input.brand_id);
            self.products.lock().unwrap().push(product.clone());
            Ok(product)
        }

        fn update(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, DomainError> {
            let mut products = self.products.lock().unwrap();
            Ok(products.iter_mut().find(|p| p.id == id).map(|p| {
                p.name = input.name.clone();
                p.brand_id = input.brand_id;
                p.clone()
            }))
        }

        fn delete(&self, id: i64) -> Result<bool, DomainError> {
            let mut products = self.products.lock().unwrap();
            let before = products.len();
            products.retain(|p| p.id != id);
            Ok(products.len() != before)
        }
    }

    fn product(id: i64, brand_id: Option<i64>) -> Product {
        Product {
            id,
            name: "Nescafe".to_string(),
            description: None,
            price: BigDecimal::from(99),
            category_id: 1,
            brand_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn actor(role: Role, brand_ids: &[i64]) -> Actor {
        Actor {
            user_id: 1,
            email: "someone@test.com".to_string(),
            role,
            brand_ids: brand_ids.to_vec(),
        }
    }

    fn service_with(products: Vec<Product>) -> ProductService<FakeProductRepository> {
        let repo = FakeProductRepository::default();
        *repo.products.lock().unwrap() = products;
        ProductService::new(repo)
    }

    fn rename(name: &str) -> ProductParams {
        ProductParams { name: Some(name.to_string()), ..Default::default() }
    }

    #[test]
    fn guests_and_suppliers_get_their_scope() {
        let service = service_with(vec![]);
        service.list(None).expect("guest");
        service.list(Some(&actor(Role::Supplier, &[3]))).expect("supplier");

        assert_eq!(
            *service.repo.scopes.lock().unwrap(),
            vec![ProductScope::All, ProductScope::Brands(vec![3])]
        );
    }

    #[test]
    fn customers_cannot_create() {
        let service = service_with(vec![]);
        let params = ProductParams {
            name: Some("Nescafe".to_string()),
            price: Some("99".to_string()),
            category_id: Some(1),
            ..Default::default()
        };

        assert!(matches!(
            service.create(&actor(Role::Customer, &[]), params.clone()),
            Err(DomainError::Forbidden)
        ));
        assert!(service.create(&actor(Role::Supplier, &[]), params).is_ok());
    }

    #[test]
    fn partial_update_keeps_stored_attributes() {
        let service = service_with(vec![product(1, Some(3))]);
        let updated = service
            .update(&actor(Role::Supplier, &[3]), 1, rename("Nescafe Gold"))
            .expect("update");

        assert_eq!(updated.name, "Nescafe Gold");
        assert_eq!(updated.brand_id, Some(3));
    }

    #[test]
    fn supplier_cannot_move_a_product_to_a_foreign_brand() {
        let service = service_with(vec![product(1, Some(3))]);
        let params = ProductParams { brand_id: Some(4), ..Default::default() };

        assert!(matches!(
            service.update(&actor(Role::Supplier, &[3]), 1, params),
            Err(DomainError::Forbidden)
        ));
        assert_eq!(service.get(1).expect("still there").brand_id, Some(3));
    }

    #[test]
    fn supplier_cannot_touch_foreign_products() {
        let service = service_with(vec![product(1, Some(4))]);
        let supplier = actor(Role::Supplier, &[3]);

        assert!(matches!(service.update(&supplier, 1, rename("x")), Err(DomainError::Forbidden)));
        assert!(matches!(service.delete(&supplier, 1), Err(DomainError::Forbidden)));
        service.delete(&actor(Role::Admin, &[]), 1).expect("admin delete");
        assert!(matches!(service.get(1), Err(DomainError::NotFound("Product"))));
    }
}
