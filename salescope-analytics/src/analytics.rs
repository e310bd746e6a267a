//! Analytics engine: revenue, region, product, customer and daily views.
//!
//! Every function is a single pure fold over the accepted transaction set.
//! Grouped views keep first-seen key order before their final stable sort,
//! so ties always resolve the same way for the same input.

use salescope_core::{Transaction, percentage, round2};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Default number of entries in the top-products view.
pub const DEFAULT_TOP_N: usize = 5;
/// Default quantity threshold for low performers.
pub const DEFAULT_LOW_PERFORMER_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSales {
    pub region: String,
    pub total_sales: f64,
    pub transaction_count: usize,
    /// Share of the grand total, 0 when the grand total is 0.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub avg_order_value: f64,
    /// Distinct product names, sorted.
    pub products_bought: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: String,
    pub revenue: f64,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakDay {
    pub date: String,
    pub revenue: f64,
    pub transaction_count: usize,
}

/// Insertion-ordered grouping with explicit get-or-insert.
struct Groups<A> {
    index: HashMap<String, usize>,
    entries: Vec<(String, A)>,
}

impl<A: Default> Groups<A> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str) -> &mut A {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.entries.push((key.to_string(), A::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }
}

fn fold_by<A, K, F>(txs: &[Transaction], key: K, mut step: F) -> Vec<(String, A)>
where
    A: Default,
    K: Fn(&Transaction) -> &str,
    F: FnMut(&mut A, &Transaction),
{
    let mut groups = Groups::new();
    for tx in txs {
        step(groups.entry(key(tx)), tx);
    }
    groups.entries
}

#[derive(Default)]
struct SalesAcc {
    revenue: f64,
    count: usize,
}

#[derive(Default)]
struct ProductAcc {
    quantity: i64,
    revenue: f64,
}

/// Sum of all amounts, rounded to 2 decimals.
pub fn total_revenue(txs: &[Transaction]) -> f64 {
    round2(txs.iter().map(Transaction::amount).sum())
}

/// Revenue per region with its share of the grand total, largest first.
pub fn region_wise_sales(txs: &[Transaction]) -> Vec<RegionSales> {
    let mut groups = fold_by(txs, |t| t.region.as_str(), |acc: &mut SalesAcc, t| {
        acc.revenue += t.amount();
        acc.count += 1;
    });
    let grand_total: f64 = groups.iter().map(|(_, acc)| acc.revenue).sum();

    groups.sort_by(|a, b| b.1.revenue.total_cmp(&a.1.revenue));
    groups
        .into_iter()
        .map(|(region, acc)| RegionSales {
            region,
            total_sales: round2(acc.revenue),
            transaction_count: acc.count,
            percentage: percentage(acc.revenue, grand_total),
        })
        .collect()
}

fn product_totals(txs: &[Transaction]) -> Vec<(String, ProductAcc)> {
    fold_by(txs, |t| t.product_name.as_str(), |acc: &mut ProductAcc, t| {
        acc.quantity = acc.quantity.saturating_add(t.quantity);
        acc.revenue += t.amount();
    })
}

fn to_product_sales((product, acc): (String, ProductAcc)) -> ProductSales {
    ProductSales {
        product,
        quantity: acc.quantity,
        revenue: round2(acc.revenue),
    }
}

/// The `n` products with the highest summed quantity.
pub fn top_products(txs: &[Transaction], n: usize) -> Vec<ProductSales> {
    let mut products = product_totals(txs);
    products.sort_by(|a, b| b.1.quantity.cmp(&a.1.quantity));
    products.into_iter().take(n).map(to_product_sales).collect()
}

/// Products whose summed quantity is strictly below `threshold`, smallest first.
pub fn low_performing_products(txs: &[Transaction], threshold: i64) -> Vec<ProductSales> {
    let mut low: Vec<_> = product_totals(txs)
        .into_iter()
        .filter(|(_, acc)| acc.quantity < threshold)
        .collect();
    low.sort_by_key(|(_, acc)| acc.quantity);
    low.into_iter().map(to_product_sales).collect()
}

/// Spend and basket per customer, biggest spender first.
pub fn customer_analysis(txs: &[Transaction]) -> Vec<CustomerSummary> {
    #[derive(Default)]
    struct CustomerAcc {
        spent: f64,
        count: usize,
        products: BTreeSet<String>,
    }

    let mut customers = fold_by(txs, |t| t.customer_id.as_str(), |acc: &mut CustomerAcc, t| {
        acc.spent += t.amount();
        acc.count += 1;
        acc.products.insert(t.product_name.clone());
    });
    customers.sort_by(|a, b| b.1.spent.total_cmp(&a.1.spent));

    customers
        .into_iter()
        .map(|(customer_id, acc)| CustomerSummary {
            customer_id,
            total_spent: round2(acc.spent),
            purchase_count: acc.count,
            // count >= 1 for every key that exists
            avg_order_value: round2(acc.spent / acc.count as f64),
            products_bought: acc.products.into_iter().collect(),
        })
        .collect()
}

#[derive(Default)]
struct DayAcc<'a> {
    revenue: f64,
    count: usize,
    customers: HashSet<&'a str>,
}

fn days(txs: &[Transaction]) -> BTreeMap<&str, DayAcc<'_>> {
    let mut days: BTreeMap<&str, DayAcc<'_>> = BTreeMap::new();
    for tx in txs {
        let day = days.entry(tx.date.as_str()).or_default();
        day.revenue += tx.amount();
        day.count += 1;
        day.customers.insert(tx.customer_id.as_str());
    }
    days
}

/// Revenue per date, ordered by the date string ascending.
pub fn daily_sales_trend(txs: &[Transaction]) -> Vec<DailySales> {
    days(txs)
        .into_iter()
        .map(|(date, acc)| DailySales {
            date: date.to_string(),
            revenue: round2(acc.revenue),
            transaction_count: acc.count,
            unique_customers: acc.customers.len(),
        })
        .collect()
}

/// The date with the highest revenue; on a tie the earliest date wins.
pub fn find_peak_sales_day(txs: &[Transaction]) -> Option<PeakDay> {
    let mut peak: Option<(&str, DayAcc<'_>)> = None;
    for (date, acc) in days(txs) {
        let better = match &peak {
            None => true,
            Some((_, best)) => acc.revenue > best.revenue,
        };
        if better {
            peak = Some((date, acc));
        }
    }

    peak.map(|(date, acc)| PeakDay {
        date: date.to_string(),
        revenue: round2(acc.revenue),
        transaction_count: acc.count,
    })
}

/// Average amount per transaction for each region, in `region_wise_sales` order.
pub fn region_average_transaction_value(txs: &[Transaction]) -> Vec<(String, f64)> {
    let mut groups = fold_by(txs, |t| t.region.as_str(), |acc: &mut SalesAcc, t| {
        acc.revenue += t.amount();
        acc.count += 1;
    });
    groups.sort_by(|a, b| b.1.revenue.total_cmp(&a.1.revenue));
    groups
        .into_iter()
        .map(|(region, acc)| (region, round2(acc.revenue / acc.count as f64)))
        .collect()
}

/// Lexicographic min and max of the `Date` field.
pub fn date_range(txs: &[Transaction]) -> Option<(String, String)> {
    let min = txs.iter().map(|t| t.date.as_str()).min()?;
    let max = txs.iter().map(|t| t.date.as_str()).max()?;
    Some((min.to_string(), max.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsOptions {
    pub top_n: usize,
    pub low_performer_threshold: i64,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            low_performer_threshold: DEFAULT_LOW_PERFORMER_THRESHOLD,
        }
    }
}

/// Every view over one transaction set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesAnalytics {
    pub total_revenue: f64,
    pub transaction_count: usize,
    pub average_order_value: f64,
    pub date_range: Option<(String, String)>,
    pub regions: Vec<RegionSales>,
    pub top_products: Vec<ProductSales>,
    pub customers: Vec<CustomerSummary>,
    pub daily: Vec<DailySales>,
    pub peak_day: Option<PeakDay>,
    pub low_performers: Vec<ProductSales>,
    pub region_averages: Vec<(String, f64)>,
}

impl SalesAnalytics {
    pub fn compute(txs: &[Transaction], options: &AnalyticsOptions) -> Self {
        let total = total_revenue(txs);
        let average_order_value = if txs.is_empty() {
            0.0
        } else {
            round2(txs.iter().map(Transaction::amount).sum::<f64>() / txs.len() as f64)
        };

        Self {
            total_revenue: total,
            transaction_count: txs.len(),
            average_order_value,
            date_range: date_range(txs),
            regions: region_wise_sales(txs),
            top_products: top_products(txs, options.top_n),
            customers: customer_analysis(txs),
            daily: daily_sales_trend(txs),
            peak_day: find_peak_sales_day(txs),
            low_performers: low_performing_products(txs, options.low_performer_threshold),
            region_averages: region_average_transaction_value(txs),
        }
    }
}
