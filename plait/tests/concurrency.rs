use std::sync::Arc;
use std::thread;

use plait::{Mapper, mappable};

mappable! {
    #[derive(Default)]
    pub struct Order {
        pub id: u64,
        pub customer: String,
        pub lines: Vec<Line>,
    }
}

mappable! {
    #[derive(Default)]
    pub struct Line {
        pub sku: String,
        pub quantity: String,
    }
}

mappable! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct OrderDto {
        pub id: i64,
        pub customer: String,
        pub lines: Vec<LineDto>,
    }
}

mappable! {
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct LineDto {
        pub sku: String,
        pub quantity: u32,
    }
}

fn order(id: u64) -> Order {
    Order {
        id,
        customer: format!("customer {id}"),
        lines: (0..3)
            .map(|line| Line {
                sku: format!("SKU-{id}-{line}"),
                quantity: (line + 1).to_string(),
            })
            .collect(),
    }
}

#[test]
fn threads_share_one_mapper() {
    plait_testhelpers::setup();

    let mapper = Arc::new(Mapper::new());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let mapper = Arc::clone(&mapper);
            thread::spawn(move || {
                (0..50)
                    .map(|round| {
                        let order = order(worker * 100 + round);
                        mapper.map::<Order, OrderDto>(Some(&order)).unwrap().unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let dtos = handle.join().unwrap();
        assert_eq!(dtos.len(), 50);
        for (round, dto) in dtos.iter().enumerate() {
            let id = worker as u64 * 100 + round as u64;
            let expected: OrderDto = Mapper::new().map(Some(&order(id))).unwrap().unwrap();
            assert_eq!(dto, &expected);
        }
        assert_eq!(dtos[0].id, worker as i64 * 100);
        assert_eq!(dtos[0].lines[2].quantity, 3);
    }

    assert_eq!(mapper.cached_shapes(), 2);
    let shape = mapper.type_shape::<Order, OrderDto>().unwrap();
    assert_eq!(shape.len(), 3);
}

#[test]
fn scoped_threads_borrow_the_mapper() {
    plait_testhelpers::setup();

    let mapper = Mapper::new();
    let orders: Vec<_> = (0..16).map(order).collect();

    let totals: Vec<u32> = thread::scope(|scope| {
        let handles: Vec<_> = orders
            .chunks(4)
            .map(|chunk| {
                let mapper = &mapper;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|order| {
                            let dto: OrderDto = mapper.map(Some(order)).unwrap().unwrap();
                            dto.lines.iter().map(|line| line.quantity).sum::<u32>()
                        })
                        .sum()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(totals, [24, 24, 24, 24]);
    assert_eq!(mapper.cached_shapes(), 2);
}
