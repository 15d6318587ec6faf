//! Guarded bindings and ignored events.

use saga_machine::builder::StateMachineBuilder;
use saga_machine::core::{SagaInstance, State, StateAccessor};
use saga_machine::engine::Disposition;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
struct Instance {
    id: Uuid,
    state: Option<State>,
    touched: u32,
}

impl Instance {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: None,
            touched: 0,
        }
    }
}

impl SagaInstance for Instance {
    fn correlation_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone)]
struct Data {
    condition: bool,
}

fn builder() -> StateMachineBuilder<Instance> {
    StateMachineBuilder::new(
        "conditions",
        StateAccessor::new(
            |i: &Instance| i.state.clone(),
            |i: &mut Instance, s| i.state = Some(s),
        ),
    )
}

#[tokio::test]
async fn payload_selects_the_binding() {
    let mut machine = builder();
    let initial = machine.initial();
    let yes = machine.declare_state("True");
    let no = machine.declare_state("False");
    let thing = machine.declare_event::<Data>("Thing");

    machine
        .during_if(&initial, &thing, |ctx| ctx.data().condition, |b| {
            b.then(|ctx| {
                ctx.instance_mut().touched += 1;
                Ok(())
            })
            .transition_to(&yes)
        })
        .during_if(&initial, &thing, |ctx| !ctx.data().condition, |b| {
            b.then(|ctx| {
                ctx.instance_mut().touched += 10;
                Ok(())
            })
            .transition_to(&no)
        });
    let machine = machine.build().unwrap();

    let mut instance = Instance::new();
    machine
        .raise_event(&mut instance, &thing, Data { condition: true })
        .await
        .unwrap();
    assert_eq!(instance.state, Some(yes));
    assert_eq!(instance.touched, 1);

    instance.state = Some(machine.initial());
    machine
        .raise_event(&mut instance, &thing, Data { condition: false })
        .await
        .unwrap();
    assert_eq!(instance.state, Some(no));
    assert_eq!(instance.touched, 11);
}

#[tokio::test]
async fn guards_see_instance_state() {
    let mut machine = builder();
    let initial = machine.initial();
    let busy = machine.declare_state("Busy");
    let poke = machine.declare_event::<()>("Poke");

    machine.during_if(
        &initial,
        &poke,
        |ctx| ctx.instance().touched >= 2,
        |b| b.transition_to(&busy),
    );
    machine.during(&initial, &poke, |b| {
        b.then(|ctx| {
            ctx.instance_mut().touched += 1;
            Ok(())
        })
    });
    let machine = machine.build().unwrap();

    let mut instance = Instance::new();
    for _ in 0..3 {
        machine.raise(&mut instance, &poke).await.unwrap();
    }

    assert_eq!(instance.touched, 2);
    assert_eq!(instance.state, Some(busy));
}

#[tokio::test]
async fn unbound_event_leaves_instance_identical() {
    let mut machine = builder();
    let initial = machine.initial();
    let running = machine.declare_state("Running");
    let start = machine.declare_event::<()>("Start");
    let stop = machine.declare_event::<()>("Stop");
    machine.during(&initial, &start, |b| b.transition_to(&running));
    machine.during(&running, &stop, |b| {
        b.then(|ctx| {
            ctx.instance_mut().touched += 1;
            Ok(())
        })
        .finalize()
    });
    let machine = machine.build().unwrap();

    let mut instance = Instance::new();
    let before = instance.clone();
    let outcome = machine.raise(&mut instance, &stop).await.unwrap();

    assert_eq!(outcome.disposition(), Disposition::Unbound);
    assert!(outcome.history().is_empty());
    assert_eq!(instance, before);
}

#[tokio::test]
async fn rejected_guards_leave_instance_identical() {
    let mut machine = builder();
    let initial = machine.initial();
    let yes = machine.declare_state("True");
    let thing = machine.declare_event::<Data>("Thing");
    machine.during_if(&initial, &thing, |ctx| ctx.data().condition, |b| {
        b.then(|ctx| {
            ctx.instance_mut().touched += 1;
            Ok(())
        })
        .transition_to(&yes)
    });
    let machine = machine.build().unwrap();

    let mut instance = Instance::new();
    let before = instance.clone();
    let outcome = machine
        .raise_event(&mut instance, &thing, Data { condition: false })
        .await
        .unwrap();

    assert_eq!(outcome.disposition(), Disposition::NoMatchingGuard);
    assert_eq!(instance, before);
}
