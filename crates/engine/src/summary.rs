use api_types::{
    Shillings,
    plot::{Plot, PlotType, TenantStatus},
};

/// Collection figures for one plot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotStanding {
    pub expected: Shillings,
    pub paid: Shillings,
    pub unpaid: Shillings,
    pub paid_tenants: usize,
    pub tenants: usize,
}

/// Dashboard header totals over every plot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MonthlySummary {
    pub total_expected: Shillings,
    pub total_paid: Shillings,
    pub total_unpaid: Shillings,
    /// Rounded percent; zero when nothing is expected.
    pub collection_rate: u32,
    pub plots: usize,
    pub units: u32,
}

fn times(fee: Shillings, count: usize) -> Shillings {
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    Shillings::new(fee.value().saturating_mul(count))
}

fn expected(plot: &Plot) -> Shillings {
    if let Some(total) = plot.total_expected {
        return total;
    }
    let per_tenant = || {
        plot.fee_per_tenant
            .map(|fee| times(fee, plot.tenants.len()))
    };
    match plot.plot_type {
        Some(PlotType::Lumpsum) => plot.lumpsum_expected,
        Some(PlotType::Individual) => per_tenant(),
        None => plot.lumpsum_expected.or_else(per_tenant),
    }
    .unwrap_or_default()
}

pub fn plot_standing(plot: &Plot) -> PlotStanding {
    let paid_tenants: Vec<_> = plot
        .tenants
        .iter()
        .filter(|tenant| tenant.status == Some(TenantStatus::Paid))
        .collect();

    let expected = expected(plot);
    let paid = plot.total_paid.unwrap_or_else(|| {
        let sum = paid_tenants
            .iter()
            .filter_map(|tenant| tenant.fee.or(plot.fee_per_tenant))
            .map(Shillings::value)
            .fold(0i64, i64::saturating_add);
        Shillings::new(sum)
    });
    let unpaid = Shillings::new(expected.value().saturating_sub(paid.value()).max(0));

    PlotStanding {
        expected,
        paid,
        unpaid,
        paid_tenants: paid_tenants.len(),
        tenants: plot.tenants.len(),
    }
}

pub fn summarize(plots: &[Plot]) -> MonthlySummary {
    let mut summary = MonthlySummary {
        plots: plots.len(),
        ..MonthlySummary::default()
    };
    let (mut expected, mut paid, mut unpaid) = (0i64, 0i64, 0i64);

    for plot in plots {
        let standing = plot_standing(plot);
        expected = expected.saturating_add(standing.expected.value());
        paid = paid.saturating_add(standing.paid.value());
        unpaid = unpaid.saturating_add(standing.unpaid.value());
        let units = plot
            .units
            .unwrap_or_else(|| u32::try_from(plot.tenants.len()).unwrap_or(u32::MAX));
        summary.units = summary.units.saturating_add(units);
    }

    summary.total_expected = Shillings::new(expected);
    summary.total_paid = Shillings::new(paid);
    summary.total_unpaid = Shillings::new(unpaid);
    summary.collection_rate = if expected > 0 {
        let rate = (paid as f64 / expected as f64 * 100.0).round();
        if rate.is_finite() && rate > 0.0 {
            rate.min(u32::MAX as f64) as u32
        } else {
            0
        }
    } else {
        0
    };
    summary
}

#[cfg(test)]
mod tests {
    use api_types::plot::Tenant;

    use super::*;

    fn tenant(status: TenantStatus, fee: Option<i64>) -> Tenant {
        Tenant {
            status: Some(status),
            fee: fee.map(Shillings::new),
            ..Tenant::default()
        }
    }

    fn individual() -> Plot {
        Plot {
            id: "p1".to_string(),
            plot_type: Some(PlotType::Individual),
            fee_per_tenant: Some(Shillings::new(250)),
            tenants: vec![
                tenant(TenantStatus::Paid, None),
                tenant(TenantStatus::Paid, Some(300)),
                tenant(TenantStatus::Unpaid, None),
            ],
            ..Plot::default()
        }
    }

    #[test]
    fn individual_plot_expects_fee_per_tenant() {
        let standing = plot_standing(&individual());
        assert_eq!(standing.expected, Shillings::new(750));
        assert_eq!(standing.paid, Shillings::new(550));
        assert_eq!(standing.unpaid, Shillings::new(200));
        assert_eq!((standing.paid_tenants, standing.tenants), (2, 3));
    }

    #[test]
    fn backend_aggregates_take_precedence() {
        let plot = Plot {
            total_expected: Some(Shillings::new(1000)),
            total_paid: Some(Shillings::new(1200)),
            ..individual()
        };
        let standing = plot_standing(&plot);
        assert_eq!(standing.expected, Shillings::new(1000));
        assert_eq!(standing.unpaid, Shillings::ZERO);
    }

    #[test]
    fn summary_rate_rounds_and_handles_zero() {
        let lumpsum = Plot {
            plot_type: Some(PlotType::Lumpsum),
            lumpsum_expected: Some(Shillings::new(5000)),
            total_paid: Some(Shillings::new(2000)),
            units: Some(10),
            ..Plot::default()
        };
        let summary = summarize(&[individual(), lumpsum]);
        assert_eq!(summary.total_expected, Shillings::new(5750));
        assert_eq!(summary.total_paid, Shillings::new(2550));
        assert_eq!(summary.total_unpaid, Shillings::new(3200));
        // 2550 / 5750 = 44.3%
        assert_eq!(summary.collection_rate, 44);
        assert_eq!(summary.plots, 2);
        assert_eq!(summary.units, 13);

        assert_eq!(summarize(&[]).collection_rate, 0);
    }
}
