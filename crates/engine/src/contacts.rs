use api_types::{
    Shillings,
    plot::{Plot, PlotType, TenantStatus},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    Tenant,
    Caretaker,
    /// A lumpsum plot paid as a whole through its MPESA number.
    Lumpsum,
}

impl ContactKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Caretaker => "caretaker",
            Self::Lumpsum => "lumpsum",
        }
    }
}

/// Someone who can be billed or called, flattened out of the plot list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contact {
    pub kind: ContactKind,
    pub name: String,
    pub phone: String,
    pub amount: Option<Shillings>,
    pub status: Option<TenantStatus>,
    pub plot_id: String,
    pub plot_name: String,
    pub plot_location: String,
}

impl Contact {
    fn on(plot: &Plot, kind: ContactKind, name: &str, phone: &str) -> Self {
        Self {
            kind,
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            amount: None,
            status: None,
            plot_id: plot.id.clone(),
            plot_name: plot.name.clone(),
            plot_location: plot.location.clone(),
        }
    }
}

fn caretaker(plot: &Plot) -> Option<Contact> {
    let name = plot.caretaker_name.as_deref().map(str::trim).unwrap_or_default();
    let phone = plot.caretaker_phone.as_deref().map(str::trim).unwrap_or_default();
    (!name.is_empty() && !phone.is_empty())
        .then(|| Contact::on(plot, ContactKind::Caretaker, name, phone))
}

/// Rows offered by the STK push picker.
///
/// Tenants of individual plots are billed the plot's fee per tenant. A
/// lumpsum plot with an expected amount appears once, under the plot name
/// and its MPESA number.
pub fn stk_contacts(plots: &[Plot]) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for plot in plots {
        contacts.extend(caretaker(plot));

        match plot.plot_type {
            Some(PlotType::Individual) => {
                contacts.extend(plot.tenants.iter().map(|tenant| Contact {
                    amount: plot.fee_per_tenant.or(tenant.fee),
                    status: tenant.status,
                    ..Contact::on(plot, ContactKind::Tenant, &tenant.name, &tenant.phone)
                }));
            }
            Some(PlotType::Lumpsum) => {
                if let Some(expected) = plot.lumpsum_expected.filter(|a| a.is_positive()) {
                    let phone = plot.mpesa_number.as_deref().unwrap_or_default();
                    contacts.push(Contact {
                        amount: Some(expected),
                        ..Contact::on(plot, ContactKind::Lumpsum, &plot.name, phone)
                    });
                }
            }
            None => {}
        }
    }
    contacts
}

/// Rows of the tenants directory: caretakers and every tenant on record.
pub fn directory_rows(plots: &[Plot]) -> Vec<Contact> {
    let mut rows = Vec::new();
    for plot in plots {
        rows.extend(caretaker(plot));
        rows.extend(plot.tenants.iter().map(|tenant| Contact {
            amount: tenant.fee.or(plot.fee_per_tenant),
            status: tenant.status,
            ..Contact::on(plot, ContactKind::Tenant, &tenant.name, &tenant.phone)
        }));
    }
    rows
}

#[cfg(test)]
mod tests {
    use api_types::plot::Tenant;

    use super::*;

    fn tenant(name: &str, phone: &str, fee: Option<i64>) -> Tenant {
        Tenant {
            id: name.to_lowercase(),
            name: name.to_string(),
            phone: phone.to_string(),
            fee: fee.map(Shillings::new),
            ..Tenant::default()
        }
    }

    fn plots() -> Vec<Plot> {
        vec![
            Plot {
                id: "p1".to_string(),
                name: "Hunters Ridge".to_string(),
                location: "Kileleshwa".to_string(),
                plot_type: Some(PlotType::Individual),
                caretaker_name: Some("Otieno".to_string()),
                caretaker_phone: Some("254700000001".to_string()),
                fee_per_tenant: Some(Shillings::new(250)),
                tenants: vec![
                    tenant("Alice", "254711111111", Some(300)),
                    tenant("Brian", "254722222222", None),
                ],
                ..Plot::default()
            },
            Plot {
                id: "p2".to_string(),
                name: "Green Court".to_string(),
                plot_type: Some(PlotType::Lumpsum),
                caretaker_name: Some("Njeri".to_string()),
                caretaker_phone: None,
                lumpsum_expected: Some(Shillings::new(5000)),
                mpesa_number: Some("254733333333".to_string()),
                ..Plot::default()
            },
            Plot {
                id: "p3".to_string(),
                name: "Empty Lumpsum".to_string(),
                plot_type: Some(PlotType::Lumpsum),
                ..Plot::default()
            },
        ]
    }

    #[test]
    fn stk_contacts_follow_plot_type() {
        let contacts = stk_contacts(&plots());
        let summary: Vec<(ContactKind, &str, Option<i64>)> = contacts
            .iter()
            .map(|c| (c.kind, c.name.as_str(), c.amount.map(Shillings::value)))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ContactKind::Caretaker, "Otieno", None),
                (ContactKind::Tenant, "Alice", Some(250)),
                (ContactKind::Tenant, "Brian", Some(250)),
                (ContactKind::Lumpsum, "Green Court", Some(5000)),
            ]
        );
        assert_eq!(contacts[3].phone, "254733333333");
    }

    #[test]
    fn caretaker_needs_name_and_phone() {
        assert!(
            stk_contacts(&plots())
                .iter()
                .all(|c| c.name != "Njeri")
        );
    }

    #[test]
    fn directory_lists_tenants_with_their_own_fee() {
        let rows = directory_rows(&plots());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].amount, Some(Shillings::new(300)));
        assert_eq!(rows[2].amount, Some(Shillings::new(250)));
        assert!(rows.iter().all(|r| r.kind != ContactKind::Lumpsum));
        assert_eq!(rows[1].plot_location, "Kileleshwa");
    }
}
